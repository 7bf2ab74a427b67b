//! Server-rendered HTML pages.

use std::fmt::Write as _;

use cottage_advice::{
    RecommendationBook, detailed_recommendation, issue_emoji, issue_severity, label_emoji,
    short_recommendation,
};
use cottage_inspector::InspectionReport;

const STYLE: &str = r#"
      * { box-sizing: border-box; }
      body { margin: 0; font-family: system-ui, sans-serif; color: #1f2a1f; background: #f6f4ee; }
      header { background: #2f5233; color: #fff; padding: 0.75rem 1.5rem; display: flex; gap: 1.5rem; align-items: center; }
      header a { color: #fff; text-decoration: none; }
      header .brand { font-weight: 700; margin-right: auto; }
      main { max-width: 960px; margin: 0 auto; padding: 1.5rem; }
      .card { background: #fff; border-radius: 8px; padding: 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
      .button { display: inline-block; background: #2f5233; color: #fff; padding: 0.5rem 1rem; border-radius: 6px; border: 0; text-decoration: none; cursor: pointer; }
      .button.secondary { background: #8a8f7a; }
      .button.danger { background: #a33b2b; }
      .severity-normal { color: #2f7d32; }
      .severity-minor { color: #b59a00; }
      .severity-moderate { color: #c66a00; }
      .severity-severe { color: #a33b2b; }
      table { width: 100%; border-collapse: collapse; }
      th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #e4e1d8; }
      textarea { width: 100%; min-height: 18rem; font-family: inherit; }
      video, canvas, #preview { max-width: 100%; border-radius: 6px; }
      .error { color: #a33b2b; }
"#;

const INSPECTION_SCRIPT: &str = r#"
      const form = document.getElementById('upload-form');
      const fileInput = document.getElementById('file');
      const status = document.getElementById('status');
      const video = document.getElementById('camera');
      const canvas = document.getElementById('snapshot');
      let capturedImage = null;

      async function submit(formData) {
        status.textContent = 'Analysing image...';
        status.className = '';
        try {
          const response = await fetch('/predict', { method: 'POST', body: formData });
          const result = await response.json();
          if (result.error) {
            status.textContent = result.error;
            status.className = 'error';
            return;
          }
          window.location.href = '/detailed_report';
        } catch (err) {
          status.textContent = 'Upload failed: ' + err;
          status.className = 'error';
        }
      }

      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const formData = new FormData();
        if (fileInput.files.length > 0) {
          formData.append('file', fileInput.files[0]);
        } else if (capturedImage) {
          formData.append('image_data', capturedImage);
        }
        submit(formData);
      });

      document.getElementById('start-camera').addEventListener('click', async () => {
        try {
          const stream = await navigator.mediaDevices.getUserMedia({ video: { facingMode: 'environment' } });
          video.srcObject = stream;
          video.hidden = false;
          document.getElementById('capture').hidden = false;
        } catch (err) {
          status.textContent = 'Camera unavailable: ' + err;
          status.className = 'error';
        }
      });

      document.getElementById('capture').addEventListener('click', () => {
        canvas.width = video.videoWidth;
        canvas.height = video.videoHeight;
        canvas.getContext('2d').drawImage(video, 0, 0);
        capturedImage = canvas.toDataURL('image/jpeg', 0.9);
        fileInput.value = '';
        const formData = new FormData();
        formData.append('image_data', capturedImage);
        submit(formData);
      });
"#;

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Path segment for a class name. Labels only ever contain letters and spaces.
fn path_segment(name: &str) -> String {
    name.replace(' ', "%20")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{title} · Cottage Inspector</title>
    <style>{STYLE}</style>
  </head>
  <body>
    <header>
      <a class="brand" href="/">🏡 Cottage Inspector</a>
      <a href="/inspection">Inspect</a>
      <a href="/history">History</a>
      <a href="/guide.html">Guide</a>
      <a href="/about.html">About</a>
    </header>
    <main>
{body}
    </main>
  </body>
</html>
"#,
        title = escape(title),
    )
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "<p>None required.</p>".to_owned();
    }
    let mut html = String::from("<ul>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ul>");
    html
}

fn numbered_list(items: &[String]) -> String {
    let mut html = String::from("<ol>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ol>");
    html
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

pub fn home() -> String {
    layout(
        "Home",
        r#"      <section class="card">
        <h1>Check your cottage exterior in seconds</h1>
        <p>Upload or snap a photo of a wall, and the inspector will identify algae, cracks,
        peeling paint, spalling or staining and tell you what to do about it.</p>
        <p><a class="button" href="/inspection">Start an inspection</a>
        <a class="button secondary" href="/guide.html">Maintenance guide</a></p>
      </section>
      <section class="card">
        <h2>How it works</h2>
        <ol>
          <li>Take a clear, well-lit photo of one section of the exterior.</li>
          <li>The image is analysed by a trained condition classifier.</li>
          <li>You get a report with urgency, cost estimate and repair steps.</li>
        </ol>
      </section>"#,
    )
}

pub fn inspection() -> String {
    let body = format!(
        r#"      <section class="card">
        <h1>New inspection</h1>
        <form id="upload-form">
          <p><label for="file">Upload a photo</label><br />
          <input type="file" id="file" name="file" accept="image/*" /></p>
          <p><button class="button" type="submit">Analyse photo</button></p>
        </form>
        <p>Or use your camera:</p>
        <p><button class="button secondary" id="start-camera" type="button">Open camera</button>
        <button class="button" id="capture" type="button" hidden>Capture &amp; analyse</button></p>
        <video id="camera" autoplay playsinline hidden></video>
        <canvas id="snapshot" hidden></canvas>
        <p id="status"></p>
      </section>
      <script>{INSPECTION_SCRIPT}</script>"#
    );
    layout("Inspection", &body)
}

pub fn detailed_report(report: &InspectionReport) -> String {
    let label = report.label();
    let details = report.details;
    let severity = report.severity.as_str();
    let referral = match (&details.referral_type, details.referral_needed) {
        (Some(kind), true) => format!("Yes, contact a {}", escape(kind)),
        _ => yes_no(details.referral_needed).to_owned(),
    };

    let body = format!(
        r#"      <section class="card">
        <h1>{emoji} {label}</h1>
        <p>Inspected {timestamp} · Severity: <strong class="severity-{severity}">{severity}</strong></p>
        <p><strong>{recommendation}</strong></p>
      </section>
      <section class="card">
        <h2>{status}</h2>
        <p>{summary}</p>
        <table>
          <tr><th>Urgency</th><td>{urgency}</td></tr>
          <tr><th>Recommended action</th><td>{action}</td></tr>
          <tr><th>Estimated cost</th><td>{cost}</td></tr>
          <tr><th>Timeframe</th><td>{timeframe}</td></tr>
          <tr><th>DIY possible</th><td>{diy}</td></tr>
          <tr><th>Professional referral</th><td>{referral}</td></tr>
        </table>
      </section>
      <section class="card">
        <h2>Materials</h2>
        {materials}
        <h2>Tools</h2>
        {tools}
        <h2>Steps</h2>
        {steps}
      </section>
      <p><a class="button" href="/email_template/{label_path}">Draft an email to a professional</a>
      <a class="button secondary" href="/inspection">Inspect another photo</a>
      <a class="button secondary" href="/history">View history</a></p>"#,
        emoji = report.emoji,
        label = escape(label.as_str()),
        timestamp = escape(&report.result.timestamp),
        recommendation = escape(report.recommendation),
        status = escape(&details.status),
        summary = escape(&details.summary),
        urgency = escape(&details.urgency),
        action = escape(&details.action),
        cost = escape(&details.estimated_cost),
        timeframe = escape(&details.timeframe),
        diy = yes_no(details.diy_possible),
        materials = bullet_list(&details.materials),
        tools = bullet_list(&details.tools),
        steps = numbered_list(&details.steps),
        label_path = path_segment(label.as_str()),
    );
    layout("Detailed report", &body)
}

/// `entries` are `(display_index, report)` pairs, most recent first.
pub fn history(entries: &[(usize, InspectionReport)]) -> String {
    if entries.is_empty() {
        return layout(
            "History",
            r#"      <section class="card">
        <h1>Inspection history</h1>
        <p>No inspections yet.</p>
        <p><a class="button" href="/inspection">Start an inspection</a></p>
      </section>"#,
        );
    }

    let issues = entries.iter().filter(|(_, report)| report.is_issue()).count();
    let mut rows = String::new();
    for (index, report) in entries {
        let severity = report.severity.as_str();
        let _ = write!(
            rows,
            r#"
          <tr>
            <td>{timestamp}</td>
            <td>{emoji} {label}</td>
            <td class="severity-{severity}">{severity}</td>
            <td>{recommendation}</td>
            <td><a href="/result/{index}">View</a> · <a href="/delete_report/{index}">Delete</a></td>
          </tr>"#,
            timestamp = escape(&report.result.timestamp),
            emoji = report.emoji,
            label = escape(report.label().as_str()),
            recommendation = escape(report.recommendation),
        );
    }

    let body = format!(
        r#"      <section class="card">
        <h1>Inspection history</h1>
        <p>{total} inspections, {issues} with issues.</p>
        <table>
          <tr><th>When</th><th>Finding</th><th>Severity</th><th>Recommendation</th><th></th></tr>{rows}
        </table>
      </section>
      <p><a class="button secondary" href="/api/export_history">Export JSON</a>
      <a class="button danger" href="/clear_history">Clear history</a></p>"#,
        total = entries.len(),
    );
    layout("History", &body)
}

pub fn email_template(issue_type: &str, inspection_date: &str) -> String {
    let details = detailed_recommendation(issue_type);
    let contact = details
        .referral_type
        .as_deref()
        .map(|referral| referral.split(" (").next().unwrap_or(referral).trim())
        .filter(|referral| !referral.is_empty())
        .unwrap_or("Maintenance Contractor");
    let severity = issue_severity(issue_type).as_str();

    let subject = format!("Cottage exterior inspection: {issue_type} found");
    let message = format!(
        "Dear {contact},\n\n\
         A recent inspection of my cottage exterior ({inspection_date}) identified the \
         following condition: {issue_type} (severity: {severity}).\n\n\
         Assessment: {summary}\n\
         Recommended action: {recommendation}\n\
         Estimated cost range: {cost}\n\n\
         I would like to arrange a site visit to assess the condition and receive a \
         quotation for the repair work. Please let me know your availability.\n\n\
         Kind regards,\n",
        summary = details.summary,
        recommendation = short_recommendation(issue_type),
        cost = details.estimated_cost,
    );

    let body = format!(
        r#"      <section class="card">
        <h1>{emoji} Contact a professional</h1>
        <p>Issue: <strong>{issue}</strong> · Inspection date: {date}</p>
        <p><label>Subject<br /><input id="subject" size="60" value="{subject}" /></label></p>
        <p><label>Message<br /><textarea id="message">{message}</textarea></label></p>
        <p><button class="button" type="button" onclick="navigator.clipboard.writeText(document.getElementById('message').value)">Copy message</button>
        <a class="button secondary" href="/detailed_report">Back to report</a></p>
      </section>"#,
        emoji = issue_emoji(issue_type),
        issue = escape(issue_type),
        date = escape(inspection_date),
        subject = escape(&subject),
        message = escape(&message),
    );
    layout("Email template", &body)
}

pub fn guide() -> String {
    let mut sections = String::new();
    for (label, entry) in RecommendationBook::global().iter() {
        let _ = write!(
            sections,
            r#"
      <section class="card">
        <h2>{emoji} {label}</h2>
        <p>{summary}</p>
        <p><strong>Urgency:</strong> {urgency} · <strong>Typical cost:</strong> {cost}</p>
      </section>"#,
            emoji = label_emoji(*label),
            label = escape(label.as_str()),
            summary = escape(&entry.summary),
            urgency = escape(&entry.urgency),
            cost = escape(&entry.estimated_cost),
        );
    }

    let body = format!(
        r#"      <section class="card">
        <h1>Cottage maintenance guide</h1>
        <p>The seven conditions the inspector recognises, and what each one means for your home.</p>
      </section>{sections}"#
    );
    layout("Guide", &body)
}

pub fn about() -> String {
    layout(
        "About",
        r#"      <section class="card">
        <h1>About Cottage Inspector</h1>
        <p>Cottage Inspector helps homeowners spot exterior surface problems early. A
        convolutional image classifier trained on photos of cottage walls sorts each photo
        into one of seven conditions: algae, major crack, minor crack, normal, peeling,
        spalling and stain.</p>
        <p>Recommendations are general guidance. For major cracks or anything structural,
        always consult a qualified professional.</p>
      </section>"#,
    )
}

pub fn not_found() -> String {
    layout(
        "Page not found",
        r#"      <section class="card">
        <h1>404 · Page not found</h1>
        <p>The page you were looking for does not exist.</p>
        <p><a class="button" href="/">Back to home</a></p>
      </section>"#,
    )
}

pub fn server_error() -> String {
    layout(
        "Server error",
        r#"      <section class="card">
        <h1>500 · Something went wrong</h1>
        <p>The inspector hit an unexpected error. Please try again.</p>
        <p><a class="button" href="/">Back to home</a></p>
      </section>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn email_template_escapes_free_form_issue_types() {
        let page = email_template("<b>Mould</b>", "Recent");
        assert!(page.contains("&lt;b&gt;Mould&lt;/b&gt;"));
        assert!(!page.contains("<b>Mould</b>"));
        assert!(page.contains("🔵"));
    }

    #[test]
    fn email_salutation_names_the_trade_only() {
        let spalling = email_template("Spalling", "2026-03-01 09:30:00");
        assert!(spalling.contains("Dear Mason or Concrete Contractor,"));
        assert!(!spalling.contains("Dear Mason or Concrete Contractor (for major spalling)"));

        let crack = email_template("Major Crack", "Recent");
        assert!(crack.contains("Dear Structural Engineer,"));

        let algae = email_template("Algae", "Recent");
        assert!(algae.contains("Dear Maintenance Contractor,"));
    }

    #[test]
    fn guide_lists_every_condition() {
        let page = guide();
        for label in cottage_protocol::ClassLabel::ALL {
            assert!(page.contains(label.as_str()));
        }
    }
}
