//! Prompts for LLM analysis of extracted report text.
//!
//! Every prompt lives here so a wording change touches exactly one place and
//! unit tests can inspect the prompts without calling a model. Callers can
//! override the selected prompt with
//! [`crate::config::AnalysisConfig::prompt_template`].
//!
//! All templates use a single `{text}` placeholder for the extracted text.

use crate::config::AnalysisKind;

/// System message sent ahead of every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a careful medical report assistant. \
You explain laboratory results and medicine labels in plain language for patients. \
You never invent values that are not present in the text, and you say so when the \
text is too garbled to interpret.";

/// Full structured analysis of a lab report.
pub const FULL_ANALYSIS_PROMPT: &str = r#"Analyze this medical report and provide:
1. **Report Type**: Identify what kind of medical test/report this is
2. **Key Values**: List all important medical values with their units
3. **Normal Ranges**: Show normal ranges for each value
4. **Interpretation**: Explain what the values mean in simple terms
5. **Abnormal Findings**: Highlight any values outside normal range
6. **Recommendations**: Suggest if consultation with a doctor is needed

Medical Report Text:
{text}

Format your response clearly with headers and bullet points."#;

/// A few sentences for a quick read.
pub const QUICK_SUMMARY_PROMPT: &str = r#"Summarize this medical report in at most five short sentences.
Mention the type of report, any values outside the normal range, and whether a
doctor should be consulted.

Medical Report Text:
{text}"#;

/// Values only, one per line.
pub const VALUE_EXTRACTION_PROMPT: &str = r#"List every measured value in this medical report, one per line, as:
<test name>: <value> <unit> (reference: <range or "not given">)

Do not add interpretation or commentary. If the text contains no measured values,
reply with "No values found."

Medical Report Text:
{text}"#;

/// Medicine packaging scanned with the medicine-label profile.
pub const MEDICINE_LABEL_PROMPT: &str = r#"I scanned this text from a medicine box:
"{text}"

Please:
1. Identify the correct medicine name.
2. State the usual dose and strength clearly.
3. Explain what it is used for in simple words.
4. Give clear instructions for how a patient should take it.
5. Mention any important safety warnings in simple language.

Write this in plain, friendly English for someone with no medical background.
Keep it short, clear and easy to read.
Use short sentences."#;

/// The built-in template for an analysis kind.
pub fn template_for(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::FullAnalysis => FULL_ANALYSIS_PROMPT,
        AnalysisKind::QuickSummary => QUICK_SUMMARY_PROMPT,
        AnalysisKind::ValueExtraction => VALUE_EXTRACTION_PROMPT,
        AnalysisKind::MedicineLabel => MEDICINE_LABEL_PROMPT,
    }
}

/// Fill the template (custom if given, else built-in) with the extracted text.
pub fn build_prompt(kind: AnalysisKind, custom_template: Option<&str>, text: &str) -> String {
    custom_template
        .unwrap_or_else(|| template_for(kind))
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_a_placeholder() {
        for kind in [
            AnalysisKind::FullAnalysis,
            AnalysisKind::QuickSummary,
            AnalysisKind::ValueExtraction,
            AnalysisKind::MedicineLabel,
        ] {
            assert!(template_for(kind).contains("{text}"), "{kind:?}");
        }
    }

    #[test]
    fn full_analysis_has_six_sections() {
        for heading in [
            "Report Type",
            "Key Values",
            "Normal Ranges",
            "Interpretation",
            "Abnormal Findings",
            "Recommendations",
        ] {
            assert!(FULL_ANALYSIS_PROMPT.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn build_prompt_inserts_text() {
        let p = build_prompt(AnalysisKind::FullAnalysis, None, "Hb 13.5 g/dL");
        assert!(p.contains("Medical Report Text:\nHb 13.5 g/dL\n"));
        assert!(!p.contains("{text}"));
    }

    #[test]
    fn custom_template_wins() {
        let p = build_prompt(
            AnalysisKind::MedicineLabel,
            Some("Translate to French: {text}"),
            "paracetamol 500mg",
        );
        assert_eq!(p, "Translate to French: paracetamol 500mg");
    }
}
