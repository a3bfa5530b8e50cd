use crate::questions::strip_fences;
use crate::result::AiError;
use crate::snapshot::AssessmentSnapshot;

/// Prompt asking for a single-number USD estimate.
pub fn estimate_prompt(snapshot: &AssessmentSnapshot) -> String {
    let mut context = String::new();
    for note in &snapshot.hotspots {
        context.push_str(&format!(
            "- {} ({}): {}\n",
            note.part, note.severity, note.issue
        ));
    }
    for qa in &snapshot.answers {
        context.push_str(&format!("- {}: {}\n", qa.question, qa.answer));
    }

    format!(
        "Based on the following assessment data for a {vehicle}, provide an estimated cost \
         for a full detailing service. Consider the vehicle's condition and the level of \
         detailing required.\nRequested services: {services}.\nAssessment data:\n{context}\n\
         Provide the estimate as a single number representing the total cost in USD.",
        vehicle = snapshot.vehicle,
        services = snapshot.services.join(", "),
    )
}

/// Prompt asking for a short condition summary (free text, no parsing).
pub fn summary_prompt(snapshot: &AssessmentSnapshot) -> String {
    let mut hotspots = String::new();
    for note in &snapshot.hotspots {
        hotspots.push_str(&format!(
            "- {} ({}): {}\n",
            note.part, note.severity, note.issue
        ));
    }

    format!(
        "Summarize the condition of a {vehicle} for a detailing work order in 2-3 sentences, \
         based on these reported issues:\n{hotspots}\
         Keep it factual; do not quote prices.",
        vehicle = snapshot.vehicle,
    )
}

/// Best-effort parse of a dollar estimate into minor currency units.
///
/// Tolerates fences, a leading `$` and thousands separators. Anything that
/// doesn't reduce to a non-negative number is a typed error.
pub fn parse_estimate(raw: &str) -> Result<u64, AiError> {
    let body = strip_fences(raw);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    // First whitespace-separated token that survives currency cleanup.
    let token = body
        .split_whitespace()
        .next()
        .ok_or(AiError::EmptyResponse)?;
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let dollars: f64 = cleaned
        .parse()
        .map_err(|_| AiError::Parse(format!("not a number: {token:?}")))?;

    if !dollars.is_finite() || dollars < 0.0 {
        return Err(AiError::Parse(format!("not a usable amount: {dollars}")));
    }

    Ok((dollars * 100.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decorated_amounts() {
        assert_eq!(parse_estimate("450").unwrap(), 450_00);
        assert_eq!(parse_estimate("$1,250.50").unwrap(), 1250_50);
        assert_eq!(parse_estimate("```\n300.5\n```").unwrap(), 300_50);
        assert_eq!(parse_estimate("199.99 USD total").unwrap(), 199_99);
    }

    #[test]
    fn prose_is_a_parse_error() {
        assert!(matches!(
            parse_estimate("around three hundred"),
            Err(AiError::Parse(_))
        ));
    }

    #[test]
    fn empty_response_is_typed() {
        assert_eq!(parse_estimate(""), Err(AiError::EmptyResponse));
    }
}
