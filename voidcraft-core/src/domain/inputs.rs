//! Crafting inputs

use serde::{Deserialize, Serialize};

/// Validated request payload plus the auxiliary values derived at submit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftInputs {
    /// Age classification of the story setting (e.g. "medieval")
    pub age: String,
    /// Character names, in request order
    pub names: Vec<String>,
    /// `names` joined with ", "
    pub names_joined: String,
    /// Year the job was submitted in
    pub current_year: String,
}

impl CraftInputs {
    pub fn new(age: String, names: Vec<String>, current_year: i32) -> Self {
        let names_joined = names.join(", ");
        Self {
            age,
            names,
            names_joined,
            current_year: current_year.to_string(),
        }
    }

    /// Parameters handed to the story generator
    pub fn kickoff_payload(&self) -> KickoffPayload<'_> {
        KickoffPayload {
            age: &self.age,
            names: &self.names_joined,
            names_array: &self.names,
            current_year: &self.current_year,
        }
    }
}

/// Input keys understood by the generation pipeline
#[derive(Debug, Serialize)]
pub struct KickoffPayload<'a> {
    pub age: &'a str,
    pub names: &'a str,
    pub names_array: &'a [String],
    pub current_year: &'a str,
}
