//! Prompts sent to the vision model.

/// Keys of the JSON object the model is asked to return, in prompt order.
pub const RESPONSE_FIELDS: [&str; 9] = [
    "plant_name",
    "scientific_name",
    "family",
    "description",
    "care_tips",
    "fun_facts",
    "is_toxic",
    "difficulty",
    "low_quality",
];

/// System prompt used for every analysis request.
pub const SYSTEM_PROMPT: &str = "You are an experienced botanist who identifies plants from photos \
and descriptions. Answer in English. Always reply with a single JSON object and nothing else. \
If the photo is blurry, too dark, or does not clearly show a plant, set low_quality to true \
instead of guessing.";

/// Which inputs an analysis request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisInput<'a> {
    /// A photo without a caption
    Image,
    /// A photo with an accompanying description
    ImageWithText(&'a str),
    /// A text description only
    Text(&'a str),
}

impl<'a> AnalysisInput<'a> {
    /// Classify the available inputs. Blank text counts as absent.
    ///
    /// Returns `None` when there is neither an image nor text.
    #[must_use]
    pub fn from_parts(has_image: bool, text: Option<&'a str>) -> Option<Self> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        match (has_image, text) {
            (true, Some(t)) => Some(Self::ImageWithText(t)),
            (true, None) => Some(Self::Image),
            (false, Some(t)) => Some(Self::Text(t)),
            (false, None) => None,
        }
    }

    /// Whether the request carries an image
    #[must_use]
    pub const fn has_image(&self) -> bool {
        matches!(self, Self::Image | Self::ImageWithText(_))
    }
}

fn response_contract() -> String {
    let fields = RESPONSE_FIELDS
        .iter()
        .map(|field| format!("{field} ({})", field_hint(field)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Return the information as a JSON object with exactly these keys: {fields}.")
}

fn field_hint(field: &str) -> &'static str {
    match field {
        "is_toxic" | "low_quality" => "boolean",
        "difficulty" => "easy/medium/hard",
        _ => "string",
    }
}

/// Build the user instruction for the given inputs.
#[must_use]
pub fn build_instruction(input: &AnalysisInput<'_>) -> String {
    let contract = response_contract();
    match input {
        AnalysisInput::ImageWithText(text) => format!(
            "Analyze the plant in the image together with this description: '{text}'. \
             Take both sources into account. {contract} No commentary."
        ),
        AnalysisInput::Image => {
            format!("Analyze the plant in the image and identify it. {contract} No commentary.")
        }
        AnalysisInput::Text(text) => format!(
            "Analyze this plant description: '{text}'. Identify the plant from the description. \
             {contract} This is a text description, so set low_quality=false. No commentary."
        ),
    }
}
