//! Scripted text generator for tests that must not touch the network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::TextGenerator;
use crate::error::{Error, Result};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Replies with queued responses in order and records every prompt.
pub struct ScriptedGenerator {
    name: String,
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(name: &str, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            responses: Mutex::new(responses.into_iter().map(|s| Ok(s.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose only call fails like an unreachable service.
    pub fn failing(name: &str) -> Self {
        let gen = Self::new(name, Vec::<String>::new());
        gen.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Llm("connection refused".to_string())));
        gen
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(Prompt {
            system: system.to_string(),
            user: user.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm(format!("{}: script exhausted", self.name))))
    }

    fn model(&self) -> &str {
        &self.name
    }
}
