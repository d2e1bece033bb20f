// Prompt templates for captain narration.
//
// Constructs a compact prompt embedding the pre-scored top-3 list so the
// model focuses on the justification rather than arithmetic.

use crate::captain::ScoredPlayer;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for captain narration calls.
pub fn system_prompt() -> String {
    "You are a Fantasy Premier League captaincy advisor.\n\
     \n\
     You will receive a shortlist of a manager's starting players, already \
     scored by a blend of recent form and season points per game, with a \
     penalty for limited minutes.\n\
     \n\
     Pick exactly ONE player to captain and justify the choice in a single \
     line. Use the pre-computed scores I provide; do NOT do arithmetic. \
     Be concise and direct."
        .to_string()
}

// ---------------------------------------------------------------------------
// Captain narration prompt
// ---------------------------------------------------------------------------

/// Build the user prompt for a captain recommendation.
///
/// Serializes the top-scored candidates for readability and closes with the
/// one-captain, one-line instruction.
pub fn build_captain_prompt(top: &[ScoredPlayer], gameweek: u32) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str(&format!(
        "## GAMEWEEK {gameweek} CAPTAIN SHORTLIST\n\
         Top candidates from my starting eleven, best score first:\n\n"
    ));

    for (i, p) in top.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {} - score {:.2} (form {}, ppg {}, {} minutes)\n",
            i + 1,
            p.name,
            p.score,
            p.form,
            p.points_per_game,
            p.minutes,
        ));
    }

    prompt.push_str(
        "\n## WHO SHOULD I CAPTAIN?\n\
         Name one captain from the list above with a one-line justification.",
    );

    prompt
}
