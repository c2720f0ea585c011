//! Turns a [`GenerationRequest`] into the prompt sent to the image model.
//!
//! The thumbnail heuristics live here as data: one shared list of principles,
//! a template per request origin, and clauses switched on by whether overlay
//! text was supplied. Building never fails; callers validate input first.

use crate::models::{AspectRatio, GenerationRequest, PromptPayload, PromptSegment};

const PERSONA: &str =
    "You are a viral marketing expert specializing in creating clickable YouTube thumbnails.";

const PRINCIPLES: [(&str, &str); 5] = [
    (
        "High Contrast & Vibrant Colors",
        "Make the image pop. Use bright, saturated colors that grab attention.",
    ),
    (
        "Clear Focal Point",
        "The main subject should be instantly recognizable.",
    ),
    (
        "Dynamic Composition",
        "Use angles and layouts that create energy and interest.",
    ),
    (
        "Emotionally Resonant",
        "The image should evoke curiosity, excitement, or another strong emotion.",
    ),
    (
        "Readability",
        "Ensure the image is clear and understandable even at a small size.",
    ),
];

const OVERLAY_PRINCIPLE: (&str, &str) = (
    "Text Integration",
    "Include the following text in the thumbnail. Make it BIG, BOLD, and EASY TO READ. \
     Use a thick, clean font with high contrast against the background (e.g., by using an \
     outline or shadow). Place it strategically to draw attention without obscuring the main subject.",
);

const NO_TEXT_CLAUSE: &str =
    "Leave space for potential text overlays. Do not include any text in the image itself.";

struct Template {
    task: &'static str,
    instruction: &'static str,
    subject_label: &'static str,
    /// Image edits name the overlay before the description.
    overlay_first: bool,
}

const TEXT_TEMPLATE: Template = Template {
    task: "Your task is to generate an engaging, high-quality YouTube thumbnail based on the user's video idea.",
    instruction: "Create a thumbnail for a YouTube video with the following topic.",
    subject_label: "Video Topic",
    overlay_first: false,
};

const IMAGE_TEMPLATE: Template = Template {
    task: "Your task is to modify the provided image based on the user's description to create an engaging, high-quality YouTube thumbnail.",
    instruction: "Modify the reference image based on the following description to create a thumbnail that will get clicks.",
    subject_label: "Description",
    overlay_first: true,
};

pub fn build_prompt(request: &GenerationRequest) -> PromptPayload {
    let overlay = request.overlay_text();
    let ratio = request.aspect_ratio();

    match request {
        GenerationRequest::Text(origin) => PromptPayload::new(vec![PromptSegment::Text(
            render(&TEXT_TEMPLATE, ratio, overlay, &origin.prompt_text),
        )]),
        GenerationRequest::Image(origin) => PromptPayload::new(vec![
            PromptSegment::Media {
                url: origin.reference_image.clone(),
            },
            PromptSegment::Text(render(
                &IMAGE_TEMPLATE,
                ratio,
                overlay,
                &origin.description,
            )),
        ]),
    }
}

fn render(template: &Template, ratio: AspectRatio, overlay: Option<&str>, subject: &str) -> String {
    let ratio = ratio.phrase();
    let mut prompt = String::new();

    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(template.task);
    prompt.push_str("\n\n**Key principles for a great thumbnail:**\n");
    prompt.push_str(&format!("1. **Aspect Ratio:** The image MUST be {}.\n", ratio));

    let mut principles: Vec<(&str, &str)> = PRINCIPLES.to_vec();
    if overlay.is_some() {
        principles.push(OVERLAY_PRINCIPLE);
    }
    for (index, (title, body)) in principles.iter().enumerate() {
        prompt.push_str(&format!("{}. **{}:** {}\n", index + 2, title, body));
    }
    if overlay.is_none() {
        prompt.push_str(NO_TEXT_CLAUSE);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\n**Instructions:**\n{} The image MUST have a {} aspect ratio.",
        template.instruction, ratio
    ));

    // Embedded verbatim; the model is the only consumer of this text.
    let overlay_line = overlay.map(|text| format!("**Text to include:** \"{}\"", text));
    let subject_line = format!("**{}:** {}", template.subject_label, subject);

    match overlay_line {
        Some(overlay_line) if template.overlay_first => {
            prompt.push_str(&format!("\n\n{}\n\n{}", overlay_line, subject_line));
        }
        Some(overlay_line) => {
            prompt.push_str(&format!("\n\n{}\n{}", subject_line, overlay_line));
        }
        None => prompt.push_str(&format!("\n\n{}", subject_line)),
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;

    #[test]
    fn text_prompt_carries_ratio_and_overlay() {
        let request = GenerationRequest::from_text("a red bicycle on a beach")
            .with_aspect_ratio(AspectRatio::Square)
            .with_overlay_text(Some("SALE!".into()));
        let payload = build_prompt(&request);

        assert_eq!(payload.segments.len(), 1);
        assert!(payload.media().is_none());
        let text = payload.text();
        assert!(text.contains("1:1 square"));
        assert!(!text.contains("16:9 landscape"));
        assert!(text.contains("\"SALE!\""));
        assert!(text.contains("Text Integration"));
        assert!(text.contains("a red bicycle on a beach"));
        assert!(!text.contains(NO_TEXT_CLAUSE));
    }

    #[test]
    fn missing_overlay_asks_for_no_text() {
        let request = GenerationRequest::from_text("unboxing the new phone");
        let text = build_prompt(&request).text();

        assert!(text.contains("16:9 landscape"));
        assert!(text.contains("Do not include any text in the image itself."));
        assert!(!text.contains("Text to include"));
    }

    #[test]
    fn image_prompt_puts_reference_first() {
        let uri = "data:image/png;base64,iVBORw0KGgo=";
        let request = GenerationRequest::from_image(uri, "turn me into a comic hero")
            .with_overlay_text(Some("I CAN'T BELIEVE IT!".into()));
        let payload = build_prompt(&request);

        assert_eq!(payload.segments.len(), 2);
        assert_eq!(
            payload.segments[0],
            PromptSegment::Media {
                url: uri.to_string()
            }
        );
        let text = payload.text();
        assert!(text.contains("Modify the reference image"));
        assert!(text.contains("**Description:** turn me into a comic hero"));
        assert!(text.contains("I CAN'T BELIEVE IT!"));
    }

    #[test]
    fn overlay_line_order_follows_the_origin() {
        let position = |text: &str, needle: &str| text.find(needle).unwrap();

        let image = build_prompt(
            &GenerationRequest::from_image("data:image/png;base64,AA==", "turn me into a comic hero")
                .with_overlay_text(Some("WOW".into())),
        )
        .text();
        assert!(position(&image, "**Text to include:**") < position(&image, "**Description:**"));
        assert!(image.ends_with("**Description:** turn me into a comic hero"));

        let text = build_prompt(
            &GenerationRequest::from_text("a red bicycle on a beach")
                .with_overlay_text(Some("WOW".into())),
        )
        .text();
        assert!(position(&text, "**Video Topic:**") < position(&text, "**Text to include:**"));
        assert!(text.ends_with("**Text to include:** \"WOW\""));
    }

    #[test]
    fn image_prompt_without_overlay_asks_for_no_text() {
        let request = GenerationRequest::from_image("data:image/png;base64,AA==", "brighter")
            .with_aspect_ratio(AspectRatio::Square);
        let text = build_prompt(&request).text();
        assert!(text.contains("1:1 square"));
        assert!(text.contains(NO_TEXT_CLAUSE));
    }

    #[test]
    fn every_heuristic_is_present() {
        let text = build_prompt(&GenerationRequest::from_text("idea")).text();
        for (title, _) in PRINCIPLES {
            assert!(text.contains(title), "missing principle {}", title);
        }
    }
}
