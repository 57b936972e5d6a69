//! Reply formatting for plant analysis results.
//!
//! Output is Telegram HTML. Everything that came from the model is escaped;
//! the surrounding markup is fixed.

use html_escape::encode_text;

use crate::analysis::{Difficulty, PlantReport};

/// Default apology used for low-quality results.
pub const DEFAULT_ERROR_MESSAGE: &str = "Could not identify the plant from the photo or description";

/// Render a report, or the apology template if it is flagged low quality.
#[must_use]
pub fn format_reply(report: &PlantReport) -> String {
    if report.low_quality {
        format_error(None)
    } else {
        format_result(report)
    }
}

/// Render a full plant report.
///
/// Sections appear in a fixed order and optional ones are skipped when
/// absent. Every section after the title block ends with a blank line.
#[must_use]
pub fn format_result(report: &PlantReport) -> String {
    let mut lines = vec![format!("🌿 <b>{}</b>", encode_text(&report.plant_name))];

    if let Some(scientific_name) = &report.scientific_name {
        lines.push(format!("🔬 <i>{}</i>", encode_text(scientific_name)));
    }

    if let Some(family) = &report.family {
        lines.push(format!("👪 Family: {}", encode_text(family)));
    }

    lines.push(String::new());

    push_section(&mut lines, "📝 <b>Description:</b>", &report.description);

    if let Some(care_tips) = &report.care_tips {
        push_section(&mut lines, "🌱 <b>Care:</b>", care_tips);
    }

    if let Some(fun_facts) = &report.fun_facts {
        push_section(&mut lines, "💡 <b>Fun facts:</b>", fun_facts);
    }

    if let Some(difficulty) = &report.difficulty {
        lines.push(format!(
            "📊 <b>Care difficulty:</b> {}",
            encode_text(&difficulty_label(difficulty))
        ));
        lines.push(String::new());
    }

    match report.is_toxic {
        Some(true) => {
            lines.push("⚠️ <b>Warning:</b> this plant may be toxic to people or pets".to_string());
            lines.push(String::new());
        }
        Some(false) => {
            lines.push("✅ <b>Safety:</b> this plant is not toxic".to_string());
            lines.push(String::new());
        }
        None => {}
    }

    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, heading: &str, body: &str) {
    lines.push(heading.to_string());
    lines.push(encode_text(body).into_owned());
    lines.push(String::new());
}

/// Human label for a difficulty; unknown values are shown as given.
#[must_use]
pub fn difficulty_label(difficulty: &Difficulty) -> String {
    match difficulty {
        Difficulty::Easy => "🟢 Easy".to_string(),
        Difficulty::Medium => "🟡 Medium".to_string(),
        Difficulty::Hard => "🔴 Hard".to_string(),
        Difficulty::Other(raw) => raw.clone(),
    }
}

/// Render the apology template with three suggestions.
#[must_use]
pub fn format_error(message: Option<&str>) -> String {
    let message = message.unwrap_or(DEFAULT_ERROR_MESSAGE);
    format!(
        "🤔 {}\n\nTry:\n• Taking the photo in better lighting\n• Showing the whole plant\n• Adding a text description",
        encode_text(message)
    )
}
