//! Prompt that confines a news answer to fetched headlines

use crate::news::NewsItem;
use chrono::NaiveDate;
use std::fmt::Write;

const GROUNDING_RULES: &str = r"You are a senior medical consultant preparing a short healthcare update from the live search results above.

STRICT DATA USAGE RULES:
1. LIVE SEARCH ONLY: Use only the LIVE SEARCH RESULTS listed above. Do not answer from internal training data. If something the user asked about is not in the results, say it is unavailable.
2. SOURCE HIERARCHY: Prefer reports from trusted institutions (WHO, CDC, NIH, PubMed) and high-impact journals (The Lancet, JAMA, NEJM, Nature, BMJ) when they appear in the results.
3. EXACT LINKS: End every summary with a [Read Full Article](URL) link using the EXACT URL given in the results. Never invent or shorten a URL.
4. NO DISCLAIMERS ABOUT BROWSING: Do not mention a knowledge cutoff or lack of internet access. These results come from a live search.

OUTPUT FORMAT (one block per relevant result):
- ### Title
- **Summary**: 2-3 sentences.
- **Research Stage**: e.g. Preclinical, Clinical trial, Guideline, Policy
- **Source**: Name & Date
- [Read Full Article](URL)

Finish with a brief medical disclaimer.";

/// Build the single user turn sent to the model for a news request.
///
/// Every item is embedded verbatim (title, source, date, link) so the model
/// can cite nothing but what was fetched for this request.
pub fn build_grounding_prompt(query: &str, items: &[NewsItem], today: NaiveDate) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "The user is asking for: \"{}\".", query.trim());
    let _ = writeln!(prompt, "Today's date: {}.", today.format("%B %d, %Y"));
    prompt.push('\n');
    prompt.push_str("LIVE SEARCH RESULTS:\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{}. {} (Source: {}, Date: {}, Link: {})",
            i + 1,
            item.title,
            item.source,
            item.publication_date,
            item.link
        );
    }
    prompt.push('\n');
    prompt.push_str(GROUNDING_RULES);
    prompt
}
