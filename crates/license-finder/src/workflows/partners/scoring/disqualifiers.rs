//! Case-insensitive classification of free-text disqualifier labels.

/// Label assigned by the no-information short-circuit.
pub const NO_INFORMATION_DISQUALIFIER: &str = "No information available; cannot evaluate";

/// Upper bound on disqualifiers retained per score card.
pub const MAX_DISQUALIFIERS: usize = 10;

/// Targets the category pillar ("wrong category", "category mismatch").
pub fn is_category_disqualifier(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("wrong category") || label.contains("category mismatch")
}

/// Targets the distribution pillar ("distribution mismatch", mass-market misalignment).
pub fn is_distribution_disqualifier(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("distribution mismatch")
        || (label.contains("mass market")
            && (label.contains("mismatch") || label.contains("misalign")))
}

/// Severe enough to veto tiers A and B.
pub fn is_hard_disqualifier(label: &str) -> bool {
    if is_category_disqualifier(label) || is_distribution_disqualifier(label) {
        return true;
    }

    let label = label.to_lowercase();
    label.contains("dormant")
        || label.contains("dead")
        || label.contains("website down")
        || label.contains("no information available")
        || label.contains("cannot evaluate")
        || (label.contains("quality") && label.contains("issues"))
}

pub fn any_category<S: AsRef<str>>(labels: &[S]) -> bool {
    labels
        .iter()
        .any(|label| is_category_disqualifier(label.as_ref()))
}

pub fn any_distribution<S: AsRef<str>>(labels: &[S]) -> bool {
    labels
        .iter()
        .any(|label| is_distribution_disqualifier(label.as_ref()))
}

pub fn any_hard<S: AsRef<str>>(labels: &[S]) -> bool {
    labels.iter().any(|label| is_hard_disqualifier(label.as_ref()))
}

/// Trim labels, drop blanks, and keep at most [`MAX_DISQUALIFIERS`].
pub fn normalize_disqualifiers<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(|label| label.as_ref().trim())
        .filter(|label| !label.is_empty())
        .take(MAX_DISQUALIFIERS)
        .map(str::to_string)
        .collect()
}
