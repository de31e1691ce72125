use colored::Colorize;
use serde_json::json;

use crate::types::Answer;
use crate::utils::escape_html;

/// Terminal rendering of an answer, mirroring the answer page layout
pub fn render_text(answer: &Answer, refusal_message: &str) -> String {
    let mut out = String::new();

    match answer {
        Answer::Found(result) => {
            out.push_str(&format!("{}\n", "AI Response:".bold().blue()));
            out.push_str(&format!("{}\n\n", result.answer.trim_end()));
            out.push_str(&format!("{}\n", "Sources & Citations".bold()));
            out.push_str(&format!(
                "{} {}\n",
                "Source Document:".green(),
                result.source.green().bold()
            ));
            out.push_str(&format!("{} {}\n", "Snippet:".dimmed(), result.snippet.italic()));
            out.push_str(&format!(
                "{} {} seconds\n",
                "Latency:".bold(),
                result.latency_secs
            ));
        }
        Answer::Refused { .. } => {
            out.push_str(&format!("{} {}\n", "⚠".yellow(), refusal_message.yellow().bold()));
        }
    }

    out
}

pub fn render_json(answer: &Answer, refusal_message: &str) -> serde_json::Result<String> {
    let value = match answer {
        Answer::Found(result) => json!({
            "status": "found",
            "answer": result.answer,
            "source": result.source,
            "snippet": result.snippet,
            "score": result.score,
            "latency_secs": result.latency_secs,
        }),
        Answer::Refused {
            reason,
            latency_secs,
        } => json!({
            "status": "refused",
            "reason": reason,
            "message": refusal_message,
            "latency_secs": latency_secs,
        }),
    };

    serde_json::to_string_pretty(&value)
}

/// Standalone answer page
pub fn render_html(question: &str, answer: &Answer, refusal_message: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html><head><meta charset=\"utf-8\"><title>Policy Assistant</title></head><body>\n");
    out.push_str("<h1>Policy Assistant</h1>\n");
    out.push_str(&format!(
        "<p class=\"question\"><strong>Question:</strong> {}</p>\n",
        escape_html(question)
    ));

    match answer {
        Answer::Found(result) => {
            out.push_str("<h3>AI Response:</h3>\n");
            out.push_str(&format!(
                "<div class=\"answer\">{}</div>\n",
                escape_html(&result.answer)
            ));
            out.push_str("<h4>Sources &amp; Citations</h4>\n");
            out.push_str(&format!(
                "<p class=\"source\"><strong>Source Document:</strong> {}</p>\n",
                escape_html(&result.source)
            ));
            out.push_str(&format!(
                "<details><summary>View Source Snippet</summary><p><em>{}</em></p></details>\n",
                escape_html(&result.snippet)
            ));
            out.push_str(&format!(
                "<p class=\"latency\"><strong>Latency:</strong> {} seconds</p>\n",
                result.latency_secs
            ));
        }
        Answer::Refused { .. } => {
            out.push_str(&format!(
                "<p class=\"refusal\"><strong>{}</strong></p>\n",
                escape_html(refusal_message)
            ));
        }
    }

    out.push_str("</body></html>\n");
    out
}
