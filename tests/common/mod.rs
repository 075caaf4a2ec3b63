// Test oracles shared by the integration tests
#![allow(dead_code)]

use llm_trails::error::{Result, TrailsError};
use llm_trails::oracle::{MoveOracle, OracleRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Replays canned answers, then falls back to the first legal direction.
/// `Err` entries simulate transport failures.
pub struct ScriptedOracle {
    script: VecDeque<std::result::Result<String, String>>,
    pub calls: usize,
    pub prompts: Vec<String>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<std::result::Result<&str, &str>>) -> Self {
        ScriptedOracle {
            script: script
                .into_iter()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect(),
            calls: 0,
            prompts: Vec::new(),
        }
    }

    pub fn first_legal() -> Self {
        Self::new(Vec::new())
    }
}

impl MoveOracle for ScriptedOracle {
    async fn complete(&mut self, request: &OracleRequest<'_>) -> Result<String> {
        self.calls += 1;
        self.prompts.push(request.prompt.to_string());
        match self.script.pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(TrailsError::OracleTransport { message }),
            None => Ok(request.legal[0].as_str().to_string()),
        }
    }
}

/// Picks uniformly among the legal directions, wrapped in chatter
pub struct RandomOracle {
    rng: StdRng,
    pub calls: usize,
}

impl RandomOracle {
    pub fn new(seed: u64) -> Self {
        RandomOracle {
            rng: StdRng::seed_from_u64(seed),
            calls: 0,
        }
    }
}

impl MoveOracle for RandomOracle {
    async fn complete(&mut self, request: &OracleRequest<'_>) -> Result<String> {
        self.calls += 1;
        let pick = request.legal[self.rng.random_range(0..request.legal.len())];
        Ok(format!("I will go {}.", pick.as_str().to_uppercase()))
    }
}
