//! Action plans: short, plain-language steps for reaching a matched resource.
//!
//! A language-model generator is used when configured; any failure for a
//! given resource falls back to the deterministic template generator.

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;

use crate::config::ActionPlanSettings;
use crate::models::{MatchResult, NeedCategory, Resource, UserCriteria};

/// Upper bound on steps kept from a model response
const MAX_STEPS: usize = 5;

/// Leading "1." / "2)" / "-" / "*" list marker on a reply line
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+").expect("list marker pattern is valid"));

/// Errors that can occur while generating an action plan
#[derive(Debug, Error)]
pub enum ActionPlanError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Model API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Produces ordered steps for accessing a resource
#[async_trait]
pub trait ActionPlanGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        resource: &Resource,
        criteria: &UserCriteria,
    ) -> Result<Vec<String>, ActionPlanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanLanguage {
    English,
    Spanish,
}

impl PlanLanguage {
    fn detect(language: &str) -> Self {
        match language.trim().to_lowercase().as_str() {
            "spanish" | "español" | "espanol" | "es" => PlanLanguage::Spanish,
            _ => PlanLanguage::English,
        }
    }
}

/// Deterministic, template-based plan generator
///
/// Carries sentence sets for English and Spanish; other languages get the
/// English steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePlanGenerator;

impl TemplatePlanGenerator {
    /// Build the three template steps for a resource
    pub fn steps(&self, resource: &Resource, criteria: &UserCriteria) -> Vec<String> {
        let lang = PlanLanguage::detect(criteria.language());
        vec![
            contact_step(resource, lang),
            documents_step(&resource.category, lang),
            visit_step(resource, lang),
        ]
    }
}

fn contact_step(r: &Resource, lang: PlanLanguage) -> String {
    match lang {
        PlanLanguage::English => {
            if !r.phone.is_empty() {
                format!("Call {} at {} to confirm they can help with your situation.", r.name, r.phone)
            } else if !r.website.is_empty() {
                format!("Visit {} to learn how {} can help.", r.website, r.name)
            } else if !r.address.is_empty() {
                format!("Stop by {} at {} and ask how they can help.", r.name, r.address)
            } else {
                format!("Contact {} and ask how they can help.", r.name)
            }
        }
        PlanLanguage::Spanish => {
            if !r.phone.is_empty() {
                format!("Llame a {} al {} para confirmar que pueden ayudarle.", r.name, r.phone)
            } else if !r.website.is_empty() {
                format!("Visite {} para saber cómo {} puede ayudarle.", r.website, r.name)
            } else if !r.address.is_empty() {
                format!("Pase por {} en {} y pregunte cómo pueden ayudarle.", r.name, r.address)
            } else {
                format!("Comuníquese con {} y pregunte cómo pueden ayudarle.", r.name)
            }
        }
    }
}

fn documents_step(category: &str, lang: PlanLanguage) -> String {
    let need = category.parse::<NeedCategory>().ok();
    let text = match (lang, need) {
        (PlanLanguage::English, Some(NeedCategory::Food)) => {
            "Bring a photo ID and proof of address if you have them; many pantries will still serve you without them."
        }
        (PlanLanguage::English, Some(NeedCategory::Housing)) => {
            "Gather your ID, proof of income, and any lease or eviction papers before you go."
        }
        (PlanLanguage::English, Some(NeedCategory::MentalHealth)) => {
            "Ask about intake appointments, sliding-scale fees, and whether they accept your insurance."
        }
        (PlanLanguage::English, Some(NeedCategory::Legal)) => {
            "Bring any letters, notices, or court papers related to your case."
        }
        (PlanLanguage::English, Some(NeedCategory::Jobs)) => {
            "Bring a photo ID and a resume if you have one."
        }
        (PlanLanguage::English, None) => "Bring a photo ID and proof of address.",
        (PlanLanguage::Spanish, Some(NeedCategory::Food)) => {
            "Traiga una identificación con foto y un comprobante de domicilio si los tiene; muchas despensas le atenderán sin ellos."
        }
        (PlanLanguage::Spanish, Some(NeedCategory::Housing)) => {
            "Reúna su identificación, comprobante de ingresos y cualquier contrato de arrendamiento o aviso de desalojo antes de ir."
        }
        (PlanLanguage::Spanish, Some(NeedCategory::MentalHealth)) => {
            "Pregunte por citas de admisión, tarifas según ingresos y si aceptan su seguro médico."
        }
        (PlanLanguage::Spanish, Some(NeedCategory::Legal)) => {
            "Traiga cualquier carta, aviso o documento judicial relacionado con su caso."
        }
        (PlanLanguage::Spanish, Some(NeedCategory::Jobs)) => {
            "Traiga una identificación con foto y su currículum si lo tiene."
        }
        (PlanLanguage::Spanish, None) => "Traiga una identificación con foto y un comprobante de domicilio.",
    };
    text.to_string()
}

fn visit_step(r: &Resource, lang: PlanLanguage) -> String {
    let mut step = match lang {
        PlanLanguage::English => format!("Plan your visit during their hours: {}.", r.hours),
        PlanLanguage::Spanish => format!("Planifique su visita durante su horario: {}.", r.hours),
    };

    if !r.eligibility_notes.is_empty() {
        let label = match lang {
            PlanLanguage::English => "Eligibility",
            PlanLanguage::Spanish => "Requisitos",
        };
        step.push_str(&format!(" {}: {}", label, r.eligibility_notes));
    }

    step
}

#[async_trait]
impl ActionPlanGenerator for TemplatePlanGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(
        &self,
        resource: &Resource,
        criteria: &UserCriteria,
    ) -> Result<Vec<String>, ActionPlanError> {
        Ok(self.steps(resource, criteria))
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Plan generator backed by an OpenAI-compatible chat completions API
pub struct LlmPlanGenerator {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl LlmPlanGenerator {
    pub fn new(endpoint: String, api_key: String, model: String, timeout_secs: u64) -> Result<Self, ActionPlanError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            client,
        })
    }

    fn build_prompt(resource: &Resource, criteria: &UserCriteria) -> String {
        format!(
            "Write exactly 3 short, plain-language steps in {language} for someone who needs {need} help \
             to access this resource. Respond with a JSON array of strings only.\n\n\
             Name: {name}\nAddress: {address}\nHours: {hours}\nPhone: {phone}\nWebsite: {website}\n\
             Eligibility: {eligibility}\nHousehold size: {household}",
            language = criteria.language(),
            need = criteria.primary_need,
            name = resource.name,
            address = resource.address,
            hours = resource.hours,
            phone = resource.phone,
            website = resource.website,
            eligibility = resource.eligibility_notes,
            household = criteria.household_size,
        )
    }
}

/// Extract steps from a model reply
///
/// Accepts a JSON array, a `{"steps": [...]}` object, or a numbered/bulleted
/// list, optionally wrapped in a code fence.
pub fn parse_steps(raw: &str) -> Result<Vec<String>, ActionPlanError> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let steps: Vec<String> = if let Ok(list) = serde_json::from_str::<Vec<String>>(cleaned) {
        list
    } else if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(cleaned) {
        obj.get("steps")
            .and_then(|s| s.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
            .unwrap_or_default()
    } else {
        cleaned
            .lines()
            .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
            .collect()
    };

    let steps: Vec<String> = steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_STEPS)
        .collect();

    if steps.is_empty() {
        return Err(ActionPlanError::InvalidResponse("No steps in response".into()));
    }

    Ok(steps)
}

#[async_trait]
impl ActionPlanGenerator for LlmPlanGenerator {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn generate(
        &self,
        resource: &Resource,
        criteria: &UserCriteria,
    ) -> Result<Vec<String>, ActionPlanError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You help people reach local social services. Be brief and concrete.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(resource, criteria),
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ActionPlanError::ApiError(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ActionPlanError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ActionPlanError::InvalidResponse("No choices in response".into()))?;

        parse_steps(content)
    }
}

/// Attaches action plans to ranked matches
///
/// Uses the primary generator when one is configured and the template
/// generator otherwise, or whenever the primary fails for a resource.
pub struct ActionPlanService {
    primary: Option<Arc<dyn ActionPlanGenerator>>,
    fallback: TemplatePlanGenerator,
}

impl ActionPlanService {
    pub fn new(primary: Option<Arc<dyn ActionPlanGenerator>>) -> Self {
        Self {
            primary,
            fallback: TemplatePlanGenerator,
        }
    }

    pub fn template_only() -> Self {
        Self::new(None)
    }

    /// Build the service from settings, using the model only when enabled with a key
    pub fn from_settings(settings: &ActionPlanSettings) -> Self {
        let Some(api_key) = settings.active_key() else {
            return Self::template_only();
        };

        match LlmPlanGenerator::new(
            settings.endpoint.clone(),
            api_key.to_string(),
            settings.model.clone(),
            settings.timeout_secs,
        ) {
            Ok(generator) => Self::new(Some(Arc::new(generator))),
            Err(e) => {
                tracing::error!("Action-plan model unavailable, using templates: {}", e);
                Self::template_only()
            }
        }
    }

    pub fn generator_name(&self) -> &'static str {
        self.primary.as_ref().map_or(self.fallback.name(), |p| p.name())
    }

    /// Generate a plan for one resource, never failing
    pub async fn plan_for(&self, resource: &Resource, criteria: &UserCriteria) -> Vec<String> {
        if let Some(primary) = &self.primary {
            match primary.generate(resource, criteria).await {
                Ok(steps) if !steps.is_empty() => return steps,
                Ok(_) => tracing::warn!("{} returned an empty plan for {}, using template", primary.name(), resource.id),
                Err(e) => tracing::warn!("{} failed for {} ({}), using template", primary.name(), resource.id, e),
            }
        }

        self.fallback.steps(resource, criteria)
    }

    /// Attach a plan to every match, generating them concurrently
    ///
    /// Order and membership of `matches` are preserved.
    pub async fn attach(&self, matches: Vec<MatchResult>, criteria: &UserCriteria) -> Vec<MatchResult> {
        join_all(matches.into_iter().map(|m| async move {
            let plan = self.plan_for(&m.resource, criteria).await;
            MatchResult {
                action_plan: Some(plan),
                ..m
            }
        }))
        .await
    }
}

impl Default for ActionPlanService {
    fn default() -> Self {
        Self::template_only()
    }
}
