/// Explanation prompt. Replace `{reference_text}` and `{matches_block}`
/// before sending; the model must answer with a JSON array of strings, one
/// per match, in order.
pub const EXPLANATION_PROMPT: &str = "You are an HR matching assistant. For each candidate/job \
below, explain in 1-2 sentences why they are a good or poor match for the reference.\n\n\
Reference:\n{reference_text}\n\n\
Matches:\n{matches_block}\n\n\
Return a JSON array of strings, one explanation per match, in the same order.";
