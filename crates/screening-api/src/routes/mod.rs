pub mod flows;
pub mod health;
pub mod rules;
pub mod screenings;
pub mod sessions;
pub mod triage;
