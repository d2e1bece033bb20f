// Recommendation narration: prompt construction and backend clients.

pub mod client;
pub mod prompt;
