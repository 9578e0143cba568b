//! Human-readable rendering of a FinalOutput

use colored::*;
use tracing::debug;

use crate::domain::{ClarifyingQuestion, DecisionBrief, FinalOutput, Item};

/// Render the output as sectioned terminal text
///
/// Sections follow the order a reader reviews them: brief, the three
/// buckets, then run notes. A pending output renders its questions instead
/// of the buckets.
pub fn render_text(output: &FinalOutput) -> String {
    debug!(pending = output.is_pending(), "render_text: called");
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", output.decision_title.bold()));
    render_brief(&mut out, &output.brief);

    if output.is_pending() {
        render_questions(&mut out, &output.meta.clarifying_questions);
        return out;
    }

    render_items(&mut out, "Alternatives", &output.alternatives);
    render_items(&mut out, "Preferences", &output.preferences);
    render_items(&mut out, "Uncertainties", &output.uncertainties);
    render_notes(&mut out, output);
    out
}

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("{}\n", title.cyan().bold()));
}

fn render_brief(out: &mut String, brief: &DecisionBrief) {
    heading(out, "Brief");
    out.push_str(&format!("  {}\n", brief.summary));

    if !brief.hard_constraints.is_empty() {
        out.push_str(&format!("  {}\n", "Hard constraints:".dimmed()));
        for c in &brief.hard_constraints {
            out.push_str(&format!("    - {}\n", c));
        }
    }
    if !brief.soft_preferences.is_empty() {
        out.push_str(&format!("  {}\n", "Soft preferences:".dimmed()));
        for p in &brief.soft_preferences {
            out.push_str(&format!("    - {}\n", p));
        }
    }

    let ctx = &brief.context;
    let mut facts = Vec::new();
    if let Some(budget) = ctx.budget_usd {
        facts.push(format!("budget ${}", budget));
    }
    if let Some(weight) = ctx.weight_limit_kg {
        facts.push(format!("weight <= {} kg", weight));
    }
    if let Some(os) = &ctx.os {
        facts.push(format!("os {}", os));
    }
    if let Some(deadline) = &ctx.deadline {
        facts.push(format!("deadline {}", deadline));
    }
    if let Some(location) = &ctx.location {
        facts.push(format!("location {}", location));
    }
    if !facts.is_empty() {
        out.push_str(&format!("  {} {}\n", "Context:".dimmed(), facts.join(", ")));
    }
    out.push('\n');
}

fn render_items(out: &mut String, title: &str, items: &[Item]) {
    heading(out, &format!("{} ({})", title, items.len()));
    if items.is_empty() {
        out.push_str(&format!("  {}\n\n", "(none)".dimmed()));
        return;
    }
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, item.text));
        if let Some(rationale) = &item.rationale {
            out.push_str(&format!("     {}\n", rationale.dimmed()));
        }
    }
    out.push('\n');
}

fn render_questions(out: &mut String, questions: &[ClarifyingQuestion]) {
    heading(out, "Clarifying questions");
    for q in questions {
        out.push_str(&format!("  [{}] {}\n", q.id().yellow(), q.question()));
        if !q.options().is_empty() {
            out.push_str(&format!("       options: {}\n", q.options().join(" | ")));
        }
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "Awaiting answers; resume the run to continue.".yellow()));
}

fn render_notes(out: &mut String, output: &FinalOutput) {
    let meta = &output.meta;
    if meta.synthesis_summary.is_none() && meta.critic_notes.is_empty() && meta.clarification_answers.is_empty() {
        return;
    }

    heading(out, "Notes");
    if let Some(summary) = &meta.synthesis_summary {
        out.push_str(&format!("  {}\n", summary));
    }
    for note in &meta.critic_notes {
        out.push_str(&format!("  - {}\n", note));
    }
    for answer in &meta.clarification_answers {
        let question = meta
            .clarifying_questions
            .iter()
            .find(|q| q.id() == answer.question_id)
            .map(|q| q.question())
            .unwrap_or(answer.question_id.as_str());
        out.push_str(&format!("  {} {} {}\n", "Q:".dimmed(), question, answer.answer.green()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnswerType, DecisionContext, ItemKind, QuestionCategory};

    fn brief() -> DecisionBrief {
        DecisionBrief {
            title: "Travel laptop".to_string(),
            summary: "Choose a light laptop.".to_string(),
            hard_constraints: vec!["Under $1500".to_string()],
            soft_preferences: vec![],
            context: DecisionContext {
                budget_usd: Some(1500.0),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_render_complete_output() {
        colored::control::set_override(false);
        let output = FinalOutput {
            decision_title: "Travel laptop".to_string(),
            brief: brief(),
            alternatives: vec![Item::new(ItemKind::Alternative, "Buy a MacBook Air").with_rationale("Light")],
            preferences: vec![],
            uncertainties: vec![Item::new(ItemKind::Uncertainty, "Next-gen release date")],
            meta: Default::default(),
        };

        let text = render_text(&output);
        assert!(text.starts_with("Travel laptop"));
        assert!(text.contains("Under $1500"));
        assert!(text.contains("budget $1500"));
        assert!(text.contains("Alternatives (1)"));
        assert!(text.contains("  1. Buy a MacBook Air"));
        assert!(text.contains("Preferences (0)\n  (none)"));
        assert!(!text.contains("Notes"));
    }

    #[test]
    fn test_render_pending_output() {
        colored::control::set_override(false);
        let question = ClarifyingQuestion::new(
            "os",
            QuestionCategory::SoftPreference,
            "Which operating system?",
            AnswerType::Choice,
            vec!["macOS".into(), "Windows".into()],
        )
        .unwrap();
        let output = FinalOutput::pending(brief(), vec![question], "sig".to_string());

        let text = render_text(&output);
        assert!(text.contains("[os] Which operating system?"));
        assert!(text.contains("macOS | Windows"));
        assert!(!text.contains("Alternatives"));
    }
}
