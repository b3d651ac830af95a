// Personas and the persona store
//
// A persona is a named viewpoint the model argues as. The store keeps them in
// a stable user-controlled order; identity is the `PersonaId`, never the
// title, since titles can be edited or collide.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DebateConfig;
use crate::debate::template::{placeholder, PromptTemplate, Substitutions};
use crate::errors::{DebateError, DebateResult, ValidationWarning};
use crate::generators::{GenerationRequest, Generator};

/// Display colours handed out by insertion order.
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonaId(Uuid);

impl PersonaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PersonaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub title: String,
    pub description: String,
    /// Usually a single emoji
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Whether the persona takes turns in upcoming rounds
    pub participating: bool,
}

impl Persona {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: PersonaId::new(),
            title: title.into(),
            description: description.into(),
            icon: None,
            color: None,
            participating: true,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.icon = if icon.trim().is_empty() { None } else { Some(icon) };
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Icon shown next to statements; falls back to the title.
    pub fn display_icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(&self.title)
    }

    /// JSON-style representation embedded in the persona-addition prompt.
    pub fn prompt_repr(&self) -> String {
        format!(
            "{{\"title\": {}, \"description\": {}, \"emoji\": {}}}",
            json_string(&self.title),
            json_string(&self.description),
            json_string(self.icon.as_deref().unwrap_or("")),
        )
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `[CURRENT_PERSONAS]` value: every persona's repr, comma-joined in braces.
pub fn current_personas_repr<'a>(personas: impl IntoIterator<Item = &'a Persona>) -> String {
    let joined = personas
        .into_iter()
        .map(Persona::prompt_repr)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", joined)
}

/// Ordered persona collection.
#[derive(Debug, Clone, Default)]
pub struct PersonaStore {
    personas: Vec<Persona>,
    colors_assigned: usize,
}

impl PersonaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Append a persona, assigning a palette colour if it has none.
    pub fn push(&mut self, mut persona: Persona) -> PersonaId {
        if persona.color.is_none() {
            persona.color = Some(PALETTE[self.colors_assigned % PALETTE.len()].to_string());
        }
        self.colors_assigned += 1;
        let id = persona.id;
        self.personas.push(persona);
        id
    }

    /// Append an empty persona for manual entry.
    pub fn insert_blank(&mut self) -> PersonaId {
        self.push(Persona::new("", ""))
    }

    pub fn remove(&mut self, id: PersonaId) -> Option<Persona> {
        let pos = self.position(id)?;
        Some(self.personas.remove(pos))
    }

    /// Drop the last persona. The store never shrinks below one persona.
    pub fn remove_last(&mut self) -> Option<Persona> {
        if self.personas.len() <= 1 {
            return None;
        }
        self.personas.pop()
    }

    pub fn get(&self, id: PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PersonaId) -> Option<&mut Persona> {
        self.personas.iter_mut().find(|p| p.id == id)
    }

    pub fn position(&self, id: PersonaId) -> Option<usize> {
        self.personas.iter().position(|p| p.id == id)
    }

    /// Move a persona to `index` (clamped to the end). Returns false for an
    /// unknown id.
    pub fn move_to(&mut self, id: PersonaId, index: usize) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let persona = self.personas.remove(pos);
        let index = index.min(self.personas.len());
        self.personas.insert(index, persona);
        true
    }

    pub fn set_participating(&mut self, id: PersonaId, participating: bool) -> bool {
        match self.get_mut(id) {
            Some(persona) => {
                persona.participating = participating;
                true
            }
            None => false,
        }
    }

    /// Participating personas in store order. Toggling participation never
    /// changes the relative order.
    pub fn participants(&self) -> Vec<&Persona> {
        self.personas.iter().filter(|p| p.participating).collect()
    }

    /// Replace every persona, e.g. after a fresh generation. Colours restart.
    pub fn replace_all(&mut self, personas: Vec<Persona>) {
        self.personas.clear();
        self.colors_assigned = 0;
        for persona in personas {
            self.push(persona);
        }
    }

    /// Warnings for participating personas with empty fields.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        validate_participants(self.participants())
    }
}

pub fn validate_participants<'a>(
    participants: impl IntoIterator<Item = &'a Persona>,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for (position, persona) in participants.into_iter().enumerate() {
        if persona.title.trim().is_empty() {
            warnings.push(ValidationWarning::EmptyTitle { position });
        }
        if persona.description.trim().is_empty() {
            warnings.push(ValidationWarning::EmptyDescription {
                title: persona.title.clone(),
            });
        }
    }
    warnings
}

/// Ask the model for `count` personas on `topic`.
///
/// Parse failures are returned with the raw response attached and are never
/// retried here.
pub async fn generate_personas(
    generator: &dyn Generator,
    topic: &str,
    count: u32,
    config: &DebateConfig,
) -> DebateResult<Vec<Persona>> {
    let subs = Substitutions::new()
        .with(placeholder::TOPIC, topic)
        .with(placeholder::NUM_PERSONAS, count.to_string());
    let prompt = PromptTemplate::compile(&config.prompts.persona_creation).render(&subs);

    let response = generator
        .generate(&GenerationRequest::from_params(prompt, &config.llm_params))
        .await?;
    tracing::debug!("Persona generation response: {}", response);

    let personas = parse_persona_array(&response)?;
    if personas.len() != count as usize {
        tracing::warn!(
            "Asked for {} personas, model returned {}",
            count,
            personas.len()
        );
    }
    Ok(personas)
}

/// Ask the model for one more persona not already represented in `existing`.
pub async fn add_one_persona(
    generator: &dyn Generator,
    topic: &str,
    existing: &[Persona],
    config: &DebateConfig,
) -> DebateResult<Persona> {
    let subs = Substitutions::new()
        .with(placeholder::TOPIC, topic)
        .with(placeholder::CURRENT_PERSONAS, current_personas_repr(existing));
    let prompt = PromptTemplate::compile(&config.prompts.persona_addition).render(&subs);

    let response = generator
        .generate(&GenerationRequest::from_params(prompt, &config.llm_params))
        .await?;
    tracing::debug!("Persona addition response: {}", response);

    parse_single_persona(&response)
}

/// Raw JSON shape from the model; required fields are checked after parsing
#[derive(Debug, Deserialize)]
struct RawPersona {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, alias = "icon")]
    emoji: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

/// Parse a JSON array of persona objects out of a model response.
///
/// Code fences and prose around the array are tolerated: everything from the
/// first `[` to the last `]` is parsed.
pub fn parse_persona_array(response: &str) -> DebateResult<Vec<Persona>> {
    let stripped = strip_markdown_fences(response);

    let (Some(start), Some(end)) = (stripped.find('['), stripped.rfind(']')) else {
        return Err(DebateError::parse("no JSON array found", response));
    };
    if end < start {
        return Err(DebateError::parse("no JSON array found", response));
    }

    let raw: Vec<RawPersona> = serde_json::from_str(&stripped[start..=end])
        .map_err(|e| DebateError::parse(format!("invalid persona JSON: {}", e), response))?;

    if raw.is_empty() {
        return Err(DebateError::parse("model returned an empty persona list", response));
    }

    raw.into_iter()
        .enumerate()
        .map(|(idx, item)| persona_from_raw(idx, item, response))
        .collect()
}

/// Parse a single persona object, wrapping it in brackets first.
pub fn parse_single_persona(response: &str) -> DebateResult<Persona> {
    let stripped = strip_markdown_fences(response);

    let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) else {
        return Err(DebateError::parse("no JSON object found", response));
    };
    if end < start {
        return Err(DebateError::parse("no JSON object found", response));
    }

    let wrapped = format!("[{}]", &stripped[start..=end]);
    let raw: Vec<RawPersona> = serde_json::from_str(&wrapped)
        .map_err(|e| DebateError::parse(format!("invalid persona JSON: {}", e), response))?;

    match raw.into_iter().next() {
        Some(item) => persona_from_raw(0, item, response),
        None => Err(DebateError::parse("no persona in response", response)),
    }
}

fn persona_from_raw(idx: usize, raw: RawPersona, response: &str) -> DebateResult<Persona> {
    let title = raw.title.ok_or_else(|| {
        DebateError::parse(format!("persona #{} has no 'title'", idx + 1), response)
    })?;
    let description = raw.description.ok_or_else(|| {
        DebateError::parse(format!("persona #{} has no 'description'", idx + 1), response)
    })?;

    let mut persona = Persona::new(title, description);
    if let Some(emoji) = raw.emoji {
        persona = persona.with_icon(emoji);
    }
    if let Some(color) = raw.color {
        persona = persona.with_color(color);
    }
    Ok(persona)
}

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```)
fn strip_markdown_fences(s: &str) -> &str {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}
