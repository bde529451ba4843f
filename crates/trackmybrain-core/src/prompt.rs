//! Prompt assembly for memory-grounded answers and summaries.

use crate::service::ChatMessage;
use trackmybrain_memory::RetrievalContext;

/// Build the system prompt that grounds an answer in retrieved memories.
pub fn build_system_prompt(assistant_name: &str, context_text: &str) -> String {
    format!(
        "You are {assistant_name}, my personal memory assistant.\n\
Use ONLY the memories below to answer the user's question.\n\
If something isn't covered by the memories, say you don't know.\n\n\
Memories:\n\
{context_text}"
    )
    .trim()
    .to_string()
}

/// Build the transcript for a question.
///
/// A fallback context yields the bare question; otherwise the grounding
/// system prompt comes first.
pub fn answer_messages(
    assistant_name: &str,
    question: &str,
    context: &RetrievalContext,
) -> Vec<ChatMessage> {
    if context.used_fallback {
        return vec![ChatMessage::user(question)];
    }
    vec![
        ChatMessage::system(build_system_prompt(assistant_name, &context.text)),
        ChatMessage::user(question),
    ]
}

/// Build the transcript that asks for a summary of `text`.
pub fn summarize_messages(text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!("Summarize: {text}"))]
}

/// System prompt for meal photos. The `Estimated calories:` line is what
/// [`crate::completion::parse_estimated_calories`] reads back.
pub const MEAL_ANALYSIS_PROMPT: &str = "You are a nutrition coach. The user will send you a photo of a meal. \
Estimate macros and calories and respond in PLAIN TEXT (no JSON) using THIS format:\n\n\
Description: <short description of the meal>\n\
Estimated macros: protein <P> g, carbs <C> g, fats <F> g\n\
Estimated calories: <KCAL> kcal\n\
Meal type: breakfast / lunch / dinner / snack\n\
Calorie impact: likely surplus / likely deficit / roughly neutral versus a 2000 kcal day.\n\n\
Always include the line that starts with \"Estimated calories:\" so another model can later sum calories for the day.";

/// Build the transcript that asks for a nutrition estimate of the photo at `image_uri`.
pub fn meal_analysis_messages(image_uri: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(MEAL_ANALYSIS_PROMPT),
        ChatMessage::user("Look at this meal and estimate macros and calories for me.")
            .with_image(image_uri),
    ]
}
