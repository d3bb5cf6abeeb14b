//! Extract-then-summarise entry point.
//!
//! Extraction never needs an LLM. Only when it produced text is a provider
//! resolved and a single analysis request made, so an unsupported or blank
//! document costs no API call and needs no API key.

use crate::config::{AnalysisConfig, ExtractionConfig, DEFAULT_ANALYSIS_MODEL};
use crate::error::ExtractError;
use crate::extract::extract_text;
use crate::output::{ExtractionOutput, ReportAnalysis, Specialty};
use crate::pipeline::llm;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Extract a document's text and ask the LLM to analyse it.
///
/// # Errors
/// Any extraction error, a provider that cannot be configured, or an API
/// failure after all retries.
pub async fn analyze_report(
    path: impl AsRef<Path>,
    extraction_config: &ExtractionConfig,
    analysis_config: &AnalysisConfig,
) -> Result<ReportAnalysis, ExtractError> {
    let extraction = extract_text(path, extraction_config).await?;
    analyze_extraction(extraction, analysis_config).await
}

/// Analyse an extraction that has already been run.
pub async fn analyze_extraction(
    extraction: ExtractionOutput,
    config: &AnalysisConfig,
) -> Result<ReportAnalysis, ExtractError> {
    let start = Instant::now();

    if !extraction.has_text() {
        info!("Nothing to analyse ({}), skipping LLM call", extraction.strategy);
        return Ok(ReportAnalysis {
            extraction,
            analysis: None,
            specialty: None,
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }

    let provider = resolve_provider(config)?;
    let response = llm::analyze_text(&provider, &extraction.text, config).await?;
    let specialty = recommend_specialty(&response.content);
    info!(
        "Analysis complete: {} output tokens, suggest {}",
        response.output_tokens, specialty
    );

    Ok(ReportAnalysis {
        extraction,
        analysis: Some(response.content),
        specialty: Some(specialty),
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Keywords per specialty, checked in this order; first hit wins.
const SPECIALTY_KEYWORDS: &[(Specialty, &[&str])] = &[
    (Specialty::Cardiologist, &["heart", "cardiac", "hypertension"]),
    (Specialty::Neurologist, &["brain", "nerve", "migraine", "seizure"]),
    (Specialty::Orthopedic, &["bone", "joint", "fracture", "sprain"]),
    (
        Specialty::GeneralPhysician,
        &["fever", "cold", "cough", "pain", "infection"],
    ),
];

/// Suggest which kind of doctor to see from the analysis text.
///
/// Case-insensitive substring match; defaults to a general physician.
pub fn recommend_specialty(answer: &str) -> Specialty {
    let lower = answer.to_lowercase();
    SPECIALTY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map_or(Specialty::GeneralPhysician, |(s, _)| *s)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExtractError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_ANALYSIS_MODEL`]; the factory reads the matching API key.
/// 3. **Environment pair** `MEDOCR_LLM_PROVIDER` + `MEDOCR_MODEL`, when both
///    are set and non-empty.
/// 4. **Gemini** when `GEMINI_API_KEY` is set.
/// 5. **Auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_ANALYSIS_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("MEDOCR_LLM_PROVIDER"),
        std::env::var("MEDOCR_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("gemini", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExtractError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
