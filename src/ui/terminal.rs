use colored::{Color, Colorize};

use crate::domain::{Trait, TraitRatings};
use crate::services::{GeneralRating, Phase, ViewSnapshot};

const BAR_WIDTH: usize = 25;
const USER_COLOR: Color = Color::Blue;
const GENERAL_COLOR: Color = Color::Green;

/// Vote page: the form prompt before voting, both panels after
pub fn render_vote_page(snapshot: &ViewSnapshot) -> String {
    match snapshot.phase {
        Phase::NotVoted => render_vote_form(),
        Phase::Voted => render_voted(snapshot),
    }
}

/// Public results page: the general rating only
pub fn render_public_results(snapshot: &ViewSnapshot) -> String {
    let mut lines = vec![format!("{}", "General results".bold())];
    lines.extend(render_general_panel(snapshot.general));
    lines.extend(render_status(snapshot));
    lines.join("\n")
}

/// One read-only bar: `label ██████░░░░ 40%`
pub fn render_bar(label: &str, value: u8) -> String {
    let value = value.min(TraitRatings::MAX);
    let filled = usize::from(value) * BAR_WIDTH / usize::from(TraitRatings::MAX);

    format!(
        "  {:<14} {}{} {:>3}%",
        label,
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        value
    )
}

fn render_vote_form() -> String {
    let mut lines = vec![format!("{}", "What do you think?".bold())];

    for field in Trait::ALL {
        let (low, high) = field.poles();
        lines.push(format!(
            "  --{:<12} 0 = {}, 100 = {}",
            field.as_str(),
            low,
            high
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Submit with: general-rating vote --humble {n} --considerate {n} --kind {n} --smart {n}",
        n = TraitRatings::NEUTRAL
    ));
    lines.join("\n")
}

fn render_voted(snapshot: &ViewSnapshot) -> String {
    let headline = if snapshot.just_voted {
        "Thank you! Your rating was saved."
    } else {
        "You have already voted."
    };
    let mut lines = vec![format!("{}", headline.bold())];

    if let Some(ratings) = snapshot.vote.ratings() {
        lines.push(String::new());
        lines.push(format!("{}", "Your rating".bold()));
        lines.extend(render_panel(&ratings, USER_COLOR));
    }

    lines.push(String::new());
    lines.extend(render_general_panel(snapshot.general));
    lines.extend(render_status(snapshot));
    lines.join("\n")
}

fn render_general_panel(general: GeneralRating) -> Vec<String> {
    let title = match general {
        GeneralRating::Cached(_) => "General rating (cached)",
        _ => "General rating",
    };
    let mut lines = vec![format!("{}", title.bold())];

    match general.ratings() {
        Some(ratings) => lines.extend(render_panel(&ratings, GENERAL_COLOR)),
        None => lines.push(format!("  {}", "Not available yet.".dimmed())),
    }
    if general == GeneralRating::Neutral {
        lines.push(format!("  {}", "No ratings yet.".dimmed()));
    }
    lines
}

fn render_panel(ratings: &TraitRatings, color: Color) -> Vec<String> {
    ratings
        .iter()
        .map(|(field, value)| format!("{}", render_bar(field.label(), value).color(color)))
        .collect()
}

fn render_status(snapshot: &ViewSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    if snapshot.loading {
        lines.push(format!("{}", "Loading results...".dimmed()));
    }
    if let Some(error) = &snapshot.error {
        let mut line = error.message.clone();
        if error.retryable {
            line.push_str(" Run the command again to retry.");
        }
        lines.push(format!("{}", line.red()));
    }
    lines
}
