//! Maintenance guidance keyed by condition class.
//!
//! All lookups are pure functions over tables built once per process. The
//! `&str` entry points accept arbitrary names (URLs carry free-form issue
//! types) and fall back to a neutral answer for anything unrecognised.

use std::sync::LazyLock;

use cottage_protocol::{ClassLabel, RecommendationEntry, SeverityTier};
use indexmap::IndexMap;

const FALLBACK_SHORT: &str = "Consult a professional for proper assessment and repair.";
const FALLBACK_EMOJI: &str = "🔵";

static STANDARD_BOOK: LazyLock<RecommendationBook> = LazyLock::new(RecommendationBook::standard);

/// Immutable label → guidance table.
#[derive(Debug, Clone)]
pub struct RecommendationBook {
    entries: IndexMap<ClassLabel, RecommendationEntry>,
}

impl RecommendationBook {
    /// The process-wide table.
    pub fn global() -> &'static RecommendationBook {
        &STANDARD_BOOK
    }

    pub fn entry(&self, label: ClassLabel) -> &RecommendationEntry {
        // every label is inserted by `standard`, Normal is the safety net
        self.entries
            .get(&label)
            .or_else(|| self.entries.get(&ClassLabel::Normal))
            .unwrap_or_else(|| &self.entries[0])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassLabel, &RecommendationEntry)> {
        self.entries.iter()
    }

    fn standard() -> Self {
        let mut entries = IndexMap::with_capacity(ClassLabel::COUNT);
        for label in ClassLabel::ALL {
            entries.insert(label, standard_entry(label));
        }
        Self { entries }
    }
}

/// One-sentence recommendation. Unknown names get a generic referral.
pub fn short_recommendation(class_name: &str) -> &'static str {
    class_name
        .parse::<ClassLabel>()
        .map(label_short_recommendation)
        .unwrap_or(FALLBACK_SHORT)
}

pub fn label_short_recommendation(label: ClassLabel) -> &'static str {
    match label {
        ClassLabel::Normal => {
            "Your cottage structure appears to be in good condition. Continue regular maintenance."
        }
        ClassLabel::MajorCrack => {
            "Immediate attention required! Consult a structural engineer for major crack repair."
        }
        ClassLabel::MinorCrack => {
            "Monitor and seal minor cracks to prevent water damage and further deterioration."
        }
        ClassLabel::Peeling => {
            "Schedule repainting and surface preparation to protect your cottage exterior."
        }
        ClassLabel::Algae => "Clean affected areas and improve drainage to prevent moisture buildup.",
        ClassLabel::Spalling => {
            "Repair concrete/masonry spalling to prevent further structural damage."
        }
        ClassLabel::Stain => {
            "Investigate stain source and clean to maintain cottage appearance and prevent damage."
        }
    }
}

/// Full guidance. Unknown names get the `Normal` entry.
pub fn detailed_recommendation(class_name: &str) -> &'static RecommendationEntry {
    let label = class_name.parse().unwrap_or(ClassLabel::Normal);
    RecommendationBook::global().entry(label)
}

/// Unknown names land in the `minor` tier, alongside Algae, Spalling and Stain.
pub fn issue_severity(class_name: &str) -> SeverityTier {
    class_name
        .parse::<ClassLabel>()
        .map(label_severity)
        .unwrap_or(SeverityTier::Minor)
}

pub fn label_severity(label: ClassLabel) -> SeverityTier {
    match label {
        ClassLabel::Normal => SeverityTier::Normal,
        ClassLabel::MajorCrack => SeverityTier::Severe,
        ClassLabel::MinorCrack | ClassLabel::Peeling => SeverityTier::Moderate,
        ClassLabel::Algae | ClassLabel::Spalling | ClassLabel::Stain => SeverityTier::Minor,
    }
}

pub fn issue_emoji(class_name: &str) -> &'static str {
    class_name
        .parse::<ClassLabel>()
        .map(label_emoji)
        .unwrap_or(FALLBACK_EMOJI)
}

pub fn label_emoji(label: ClassLabel) -> &'static str {
    match label {
        ClassLabel::Normal => "🟢",
        ClassLabel::MajorCrack => "🔴",
        ClassLabel::MinorCrack | ClassLabel::Algae | ClassLabel::Stain => "🟡",
        ClassLabel::Peeling | ClassLabel::Spalling => "🟠",
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

fn standard_entry(label: ClassLabel) -> RecommendationEntry {
    match label {
        ClassLabel::Normal => RecommendationEntry {
            status: "good".to_owned(),
            urgency: "low".to_owned(),
            summary: "Your cottage appears to be in excellent condition with no structural issues detected.".to_owned(),
            action: "Continue regular maintenance and seasonal inspections to preserve your cottage's condition.".to_owned(),
            estimated_cost: "RM 0 - RM 300 (routine maintenance)".to_owned(),
            timeframe: "Ongoing maintenance".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: None,
            materials: lines(&[
                "Nippon Paint Weatherbond (5L) - RM 85",
                "Dulux Ambience Wood Stain (1L) - RM 45",
                "Ronseal Thompson's WaterSeal (1L) - RM 35",
                "General cleaning supplies - RM 20",
            ]),
            tools: lines(&[
                "Cleaning cloths and brushes",
                "Garden hose",
                "Basic hand tools (screwdriver, hammer)",
                "Extension ladder (if needed)",
            ]),
            steps: lines(&[
                "Perform visual inspection quarterly for any new issues",
                "Clean exterior surfaces annually with mild detergent",
                "Check for new issues after heavy rain or storms",
                "Maintain proper drainage around cottage foundation",
                "Apply protective treatments (paint/stain) every 2-3 years as needed",
            ]),
        },
        ClassLabel::MajorCrack => RecommendationEntry {
            status: "critical".to_owned(),
            urgency: "high".to_owned(),
            summary: "Significant structural damage detected that poses potential safety risks and requires immediate professional assessment.".to_owned(),
            action: "Contact a structural engineer immediately for professional evaluation. Do not attempt DIY repairs on major cracks.".to_owned(),
            estimated_cost: "RM 1,500 - RM 15,000+ (professional assessment and repair)".to_owned(),
            timeframe: "Immediate action required (within 1-2 days)".to_owned(),
            diy_possible: false,
            referral_needed: true,
            referral_type: Some("Structural Engineer".to_owned()),
            materials: lines(&[
                "Professional assessment required",
                "Structural repair materials (determined by engineer)",
                "Potential foundation work materials",
                "Waterproofing systems if needed",
            ]),
            tools: lines(&[
                "Professional equipment only",
                "Structural assessment tools",
                "Specialized repair equipment",
                "Safety equipment for workers",
            ]),
            steps: lines(&[
                "DO NOT attempt DIY repair - contact professional immediately",
                "Document the crack with photos and measurements",
                "Restrict access to affected area if safety concern",
                "Get quotes from certified structural engineers",
                "Obtain necessary permits for structural work",
                "Schedule professional repair work",
                "Arrange for post-repair inspection and certification",
            ]),
        },
        ClassLabel::MinorCrack => RecommendationEntry {
            status: "attention_needed".to_owned(),
            urgency: "medium".to_owned(),
            summary: "Small cracks detected that should be monitored and sealed to prevent water infiltration and expansion.".to_owned(),
            action: "Clean and seal cracks with appropriate filler, then monitor for growth over time.".to_owned(),
            estimated_cost: "RM 150 - RM 600 (DIY) or RM 600 - RM 1,500 (professional)".to_owned(),
            timeframe: "1-2 weeks (monitor ongoing)".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: None,
            materials: lines(&[
                "Sika Crack Repair Kit (500ml) - RM 45",
                "Dulux 1Step Primer (1L) - RM 35",
                "Nippon Paint Weatherbond (1L) - RM 25",
                "Sandpaper (120 & 220 grit) - RM 15",
                "Masking tape - RM 8",
                "Cleaning supplies - RM 20",
            ]),
            tools: lines(&[
                "Caulk gun (RM 15)",
                "Putty knife (RM 12)",
                "Wire brush (RM 8)",
                "Paintbrush 2-inch (RM 15)",
                "Measuring tape (RM 20)",
                "Safety glasses and gloves (RM 25)",
            ]),
            steps: lines(&[
                "Clean crack thoroughly using wire brush to remove all loose debris and old filler",
                "Use vacuum or compressed air to remove dust from crack interior",
                "Apply Sika Crack Repair filler using caulk gun, filling crack completely",
                "Smooth surface with putty knife, removing excess material",
                "Allow to cure for 24-48 hours as per manufacturer instructions",
                "Sand smooth with 120 grit sandpaper, then 220 grit for finishing",
                "Apply Dulux 1Step Primer to prepared surface and let dry",
                "Paint with Nippon Weatherbond using 2 coats for best protection",
                "Monitor crack monthly for 6 months for any signs of expansion",
            ]),
        },
        ClassLabel::Peeling => RecommendationEntry {
            status: "maintenance_required".to_owned(),
            urgency: "medium".to_owned(),
            summary: "Paint deterioration detected that affects both protection and aesthetics. Surface preparation and repainting needed.".to_owned(),
            action: "Remove loose paint, prepare surface properly, and repaint affected areas with high-quality exterior paint.".to_owned(),
            estimated_cost: "RM 300 - RM 2,400 (depending on area size and paint quality)".to_owned(),
            timeframe: "2-4 days (weather dependent)".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: None,
            materials: lines(&[
                "Paint scraper (RM 25)",
                "Sandpaper variety pack (RM 35)",
                "Dulux 1Step Primer (5L) - RM 120",
                "Nippon Paint Weatherbond (5L) - RM 85",
                "Drop cloths (RM 30)",
                "Masking tape (RM 15)",
                "Cleaning supplies (RM 25)",
            ]),
            tools: lines(&[
                "Paint scraper (RM 25)",
                "Electric sander (RM 150) or sanding blocks (RM 20)",
                "Paintbrush set (RM 45)",
                "Paint roller with tray (RM 35)",
                "Extension ladder (RM 200 rental/day)",
                "Safety equipment (mask, goggles) - RM 40",
            ]),
            steps: lines(&[
                "Remove all loose and peeling paint using paint scraper",
                "Sand entire surface starting with 80 grit, then 120 grit for smoothness",
                "Clean surface thoroughly with tack cloth to remove all dust",
                "Apply Dulux 1Step Primer evenly and allow to dry per instructions",
                "Lightly sand primed surface with 220 grit sandpaper",
                "Clean again with tack cloth to remove sanding dust",
                "Apply first coat of Nippon Weatherbond paint using roller and brush",
                "Allow first coat to dry completely (typically 4-6 hours)",
                "Apply second coat for optimal protection and coverage",
                "Remove masking tape while paint is still slightly wet for clean lines",
            ]),
        },
        ClassLabel::Algae => RecommendationEntry {
            status: "maintenance_required".to_owned(),
            urgency: "medium".to_owned(),
            summary: "Algae growth detected indicating moisture issues. Cleaning and moisture control needed to prevent recurrence.".to_owned(),
            action: "Clean affected areas with appropriate algaecide and address underlying moisture sources.".to_owned(),
            estimated_cost: "RM 150 - RM 900 (depending on area and cleaning method)".to_owned(),
            timeframe: "1-2 days (plus ongoing moisture management)".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: None,
            materials: lines(&[
                "Clorox Algae Remover (1L) - RM 25",
                "Domestos Bleach (1L) - RM 12",
                "Soft-bristled brush (RM 20)",
                "Spray bottle (RM 15)",
                "Protective equipment (gloves, goggles) - RM 30",
                "Anti-algae treatment (500ml) - RM 45",
            ]),
            tools: lines(&[
                "Pressure washer (RM 80/day rental) or garden hose",
                "Soft-bristled brush or broom (RM 25)",
                "Bucket for mixing solution (RM 15)",
                "Sprayer or watering can (RM 20)",
                "Rubber gloves and safety glasses (RM 30)",
            ]),
            steps: lines(&[
                "Mix cleaning solution (1 part Domestos bleach to 10 parts water)",
                "Wet the affected area with clean water first",
                "Apply cleaning solution from bottom to top using spray bottle",
                "Allow solution to sit for 10-15 minutes (don't let it dry)",
                "Scrub gently with soft brush to remove algae buildup",
                "Rinse thoroughly with clean water from top to bottom",
                "Improve drainage around affected areas by clearing gutters",
                "Trim vegetation to increase sunlight and air circulation",
                "Apply anti-algae treatment as per manufacturer instructions",
                "Monitor area monthly and reapply treatment every 6 months",
            ]),
        },
        ClassLabel::Spalling => RecommendationEntry {
            status: "repair_needed".to_owned(),
            urgency: "medium".to_owned(),
            summary: "Concrete or masonry deterioration detected. Professional repair recommended to prevent further structural damage.".to_owned(),
            action: "Repair damaged masonry to restore structural integrity and prevent water penetration.".to_owned(),
            estimated_cost: "RM 600 - RM 3,000+ (depending on extent and accessibility)".to_owned(),
            timeframe: "2-5 days (depending on scope)".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: Some("Mason or Concrete Contractor (for major spalling)".to_owned()),
            materials: lines(&[
                "Sika Concrete Repair Mortar (5kg) - RM 65",
                "Bondcrete Concrete Bonding Agent (1L) - RM 35",
                "Concrete primer (500ml) - RM 25",
                "Waterproof sealant (1L) - RM 45",
                "Wire brush (RM 15)",
                "Mixing bucket (RM 20)",
            ]),
            tools: lines(&[
                "Hammer and chisel (RM 35)",
                "Wire brush (RM 15)",
                "Mixing paddle (RM 25)",
                "Trowel (RM 20)",
                "Float (RM 25)",
                "Safety equipment (RM 40)",
            ]),
            steps: lines(&[
                "Remove all loose concrete using hammer and chisel",
                "Clean area thoroughly with wire brush to remove debris",
                "Apply Bondcrete bonding agent to cleaned surface",
                "Allow bonding agent to become tacky (about 30 minutes)",
                "Mix Sika Concrete Repair Mortar according to package instructions",
                "Apply mortar using trowel, building up in thin layers",
                "Smooth surface with float to match surrounding area",
                "Allow to cure for 24-48 hours, keeping slightly moist",
                "Apply concrete primer followed by waterproof sealant",
                "Monitor repair area for 3 months for any signs of failure",
            ]),
        },
        ClassLabel::Stain => RecommendationEntry {
            status: "cosmetic_attention".to_owned(),
            urgency: "low".to_owned(),
            summary: "Surface staining detected that may indicate underlying issues. Investigation and appropriate treatment needed.".to_owned(),
            action: "Identify stain source and apply appropriate cleaning method. Monitor for recurrence.".to_owned(),
            estimated_cost: "RM 75 - RM 450 (depending on stain type and cleaning method)".to_owned(),
            timeframe: "1 day (investigation and cleaning)".to_owned(),
            diy_possible: true,
            referral_needed: false,
            referral_type: None,
            materials: lines(&[
                "Mr. Muscle Bathroom Cleaner (500ml) - RM 15",
                "Clorox Stain Remover (1L) - RM 25",
                "Scrub brush (RM 18)",
                "Clean cloths/rags (RM 20)",
                "Protective gloves (RM 12)",
                "Stain-blocking primer (500ml) - RM 35",
            ]),
            tools: lines(&[
                "Scrub brush or power brush (RM 25)",
                "Pressure washer (RM 80/day rental) - if appropriate",
                "Bucket for mixing solutions (RM 15)",
                "Protective gloves and eyewear (RM 30)",
                "pH testing strips (RM 20) - for some stains",
            ]),
            steps: lines(&[
                "Identify stain type (rust, mold, mineral deposits, etc.)",
                "Test cleaning method on small, inconspicuous area first",
                "Apply appropriate cleaner (Mr. Muscle for mold, Clorox for general stains)",
                "Allow cleaner to work for recommended contact time",
                "Scrub gently with brush and rinse thoroughly",
                "For stubborn stains, repeat process or try stronger concentration",
                "If stain persists, apply stain-blocking primer before painting",
                "Investigate and address underlying cause (leaks, moisture, etc.)",
                "Apply protective coating if recommended for stain type",
            ]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_covers_every_label_in_output_order() {
        let book = RecommendationBook::global();
        assert_eq!(book.len(), ClassLabel::COUNT);
        let order: Vec<ClassLabel> = book.iter().map(|(label, _)| *label).collect();
        assert_eq!(order, ClassLabel::ALL.to_vec());
    }

    #[test]
    fn major_crack_needs_a_professional() {
        let entry = detailed_recommendation("Major Crack");
        assert!(!entry.diy_possible);
        assert!(entry.referral_needed);
        assert_eq!(entry.referral_type.as_deref(), Some("Structural Engineer"));
        assert_eq!(entry.urgency, "high");
    }

    #[test]
    fn normal_is_diy_without_referral() {
        let entry = detailed_recommendation("Normal");
        assert!(entry.diy_possible);
        assert!(!entry.referral_needed);
        assert!(entry.referral_type.is_none());
    }

    #[test]
    fn unknown_detailed_falls_back_to_normal() {
        assert_eq!(
            detailed_recommendation("Termites"),
            detailed_recommendation("Normal")
        );
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(issue_severity("Major Crack"), SeverityTier::Severe);
        assert_eq!(issue_severity("Minor Crack"), SeverityTier::Moderate);
        assert_eq!(issue_severity("Peeling"), SeverityTier::Moderate);
        assert_eq!(issue_severity("Algae"), SeverityTier::Minor);
        assert_eq!(issue_severity("Spalling"), SeverityTier::Minor);
        assert_eq!(issue_severity("Stain"), SeverityTier::Minor);
        assert_eq!(issue_severity("Normal"), SeverityTier::Normal);
        assert_eq!(issue_severity("whatever"), SeverityTier::Minor);
    }

    #[test]
    fn short_recommendations_and_fallback() {
        assert!(short_recommendation("Major Crack").starts_with("Immediate attention"));
        assert_eq!(short_recommendation("major crack"), FALLBACK_SHORT);
        for label in ClassLabel::ALL {
            assert_ne!(short_recommendation(label.as_str()), FALLBACK_SHORT);
        }
    }

    #[test]
    fn emoji_per_label_and_fallback() {
        assert_eq!(issue_emoji("Normal"), "🟢");
        assert_eq!(issue_emoji("Major Crack"), "🔴");
        assert_eq!(issue_emoji("Peeling"), "🟠");
        assert_eq!(issue_emoji("Stain"), "🟡");
        assert_eq!(issue_emoji(""), "🔵");
    }

    #[test]
    fn every_entry_has_guidance() {
        for (label, entry) in RecommendationBook::global().iter() {
            assert!(!entry.steps.is_empty(), "{label} has no steps");
            assert!(!entry.materials.is_empty(), "{label} has no materials");
            assert!(!entry.tools.is_empty(), "{label} has no tools");
            if entry.referral_needed {
                assert!(entry.referral_type.is_some());
            }
        }
    }
}
