// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Conversational assistant with catalog lookup tools.
//!
//! The assistant runs a bounded tool-calling loop: the model either answers
//! with text or asks for one or more tool calls, whose results are fed back
//! on the next round.

use crate::models::catalog::{ExerciseEntry, MealPlanEntry};
use crate::models::choices::{
    choice_label, parse_choice, DietPreference, DietSelection, ExerciseDifficulty, ImpactLevel,
    MealType,
};
use crate::models::{Profile, User};
use crate::services::catalog::CatalogService;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Rows returned by a single tool call.
pub const TOOL_ROW_LIMIT: usize = 5;
/// Tool rounds allowed before the conversation is abandoned.
pub const MAX_TOOL_ROUNDS: usize = 4;

const SYSTEM_INSTRUCTION: &str = "You are CUFITBot, an AI assistant that helps users with \
fitness, meal plans, and workouts. Only provide information from CUFIT's database. \
You must only call 'get_meals' using the provided 'diet_selection' and 'diet_preference' values. \
You can retrieve meals, workouts, and exercise details for users. \
If a user asks for a workout suggestion, call the 'get_exercises' tool with the correct \
difficulty level (beginner, intermediate, or advanced). \
Avoid any off-topic discussions. If asked something unrelated, politely decline. \
Do not reveal or access any other user's data under any circumstance.";

const NO_MEALS: &str = "No meals found based on your preferences.";
const NO_EXERCISES: &str = "No matching exercises found for your profile.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatPart {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse { name: String, result: String },
}

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub parts: Vec<ChatPart>,
}

/// A tool the model may call, with a JSON schema for its arguments.
#[derive(Debug, Clone)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    FunctionCalls(Vec<FunctionCall>),
}

/// Errors talking to the language model.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Model returned no usable content")]
    EmptyResponse,

    #[error("Model exceeded {0} tool rounds")]
    TooManyToolRounds(usize),
}

/// A tool-calling language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, AssistantError>;
}

/// Declarations for the two catalog tools.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: "get_meals",
            description: "Fetch personalized meals based on the user's diet, preference, and meal type.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "diet_selection": {"type": "string", "description": "Diet type, e.g. keto"},
                    "diet_preference": {"type": "string", "description": "Diet preference, e.g. vegan"},
                    "meal_type": {"type": "string", "description": "breakfast, lunch, dinner or snacks"}
                }
            }),
        },
        ToolDeclaration {
            name: "get_exercises",
            description: "Fetch personalized workouts based on difficulty and impact level.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "difficulty": {"type": "string", "description": "beginner, intermediate or advanced"},
                    "impact_level": {"type": "string", "description": "low, medium or high"}
                }
            }),
        },
    ]
}

#[derive(Debug, Default, Deserialize)]
struct GetMealsArgs {
    diet_selection: Option<String>,
    diet_preference: Option<String>,
    meal_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetExercisesArgs {
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default = "default_impact")]
    impact_level: String,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn default_impact() -> String {
    "low".to_string()
}

/// Optional equality filter parsed from free text.
///
/// `Err(())` means a value was given but names no known choice, so nothing
/// can match it.
fn optional_filter<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Result<Option<T>, ()> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_choice(s).map(Some).ok_or(()),
    }
}

/// Assistant service: prompt assembly, tool execution and the call loop.
pub struct ChatService {
    model: Arc<dyn ChatModel>,
    catalog: Arc<CatalogService>,
}

impl ChatService {
    pub fn new(model: Arc<dyn ChatModel>, catalog: Arc<CatalogService>) -> Self {
        Self { model, catalog }
    }

    /// Answer one user message.
    pub async fn reply(
        &self,
        user: &User,
        profile: &Profile,
        message: &str,
    ) -> Result<String, AssistantError> {
        let system_instruction = system_instruction(user, profile);
        let tools = tool_declarations();
        let mut history = vec![ChatTurn {
            role: Role::User,
            parts: vec![ChatPart::Text(message.to_string())],
        }];

        for round in 0..=MAX_TOOL_ROUNDS {
            let calls = match self
                .model
                .generate(&system_instruction, &history, &tools)
                .await?
            {
                ModelReply::Text(text) => return Ok(text),
                ModelReply::FunctionCalls(calls) => calls,
            };

            if round == MAX_TOOL_ROUNDS {
                break;
            }

            tracing::debug!(
                round,
                tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Assistant requested tools"
            );

            let responses = calls
                .iter()
                .map(|call| ChatPart::FunctionResponse {
                    name: call.name.clone(),
                    result: self.run_tool(call),
                })
                .collect();

            history.push(ChatTurn {
                role: Role::Model,
                parts: calls.into_iter().map(ChatPart::FunctionCall).collect(),
            });
            history.push(ChatTurn {
                role: Role::User,
                parts: responses,
            });
        }

        tracing::warn!(user_id = %user.user_id, "Assistant tool loop did not converge");
        Err(AssistantError::TooManyToolRounds(MAX_TOOL_ROUNDS))
    }

    /// Execute a tool call and render its result for the model.
    pub fn run_tool(&self, call: &FunctionCall) -> String {
        match call.name.as_str() {
            "get_meals" => match parse_args::<GetMealsArgs>(&call.args) {
                Ok(args) => self.get_meals(&args),
                Err(e) => format!("Error fetching meals: {}", e),
            },
            "get_exercises" => match parse_args::<GetExercisesArgs>(&call.args) {
                Ok(args) => self.get_exercises(&args),
                Err(e) => format!("Error fetching exercises: {}", e),
            },
            other => format!("Unknown tool: {}", other),
        }
    }

    fn get_meals(&self, args: &GetMealsArgs) -> String {
        let filters = (
            optional_filter::<DietSelection>(args.diet_selection.as_deref()),
            optional_filter::<DietPreference>(args.diet_preference.as_deref()),
            optional_filter::<MealType>(args.meal_type.as_deref()),
        );
        let (Ok(diet), Ok(preference), Ok(meal_type)) = filters else {
            return NO_MEALS.to_string();
        };

        let meals: Vec<&MealPlanEntry> = self
            .catalog
            .meals()
            .iter()
            .filter(|m| diet.is_none_or(|d| m.diet_selection == d))
            .filter(|m| preference.is_none_or(|p| m.diet_preference == Some(p)))
            .filter(|m| meal_type.is_none_or(|t| m.meal_type == t))
            .take(TOOL_ROW_LIMIT)
            .collect();

        if meals.is_empty() {
            return NO_MEALS.to_string();
        }

        let mut out = String::from("Here are some meal suggestions:\n");
        for meal in meals {
            out.push_str(&format!(
                "- {} ({}, {} cal)\n",
                meal.name,
                choice_label(&meal.meal_type),
                meal.calories
            ));
        }
        out.trim_end().to_string()
    }

    fn get_exercises(&self, args: &GetExercisesArgs) -> String {
        let (Some(difficulty), Some(impact)) = (
            parse_choice::<ExerciseDifficulty>(&args.difficulty),
            parse_choice::<ImpactLevel>(&args.impact_level),
        ) else {
            return NO_EXERCISES.to_string();
        };

        let exercises: Vec<&ExerciseEntry> = self
            .catalog
            .exercises()
            .iter()
            .filter(|e| e.difficulty == difficulty && e.impact_level == impact)
            .take(TOOL_ROW_LIMIT)
            .collect();

        if exercises.is_empty() {
            return NO_EXERCISES.to_string();
        }

        let mut out = String::from("Here are some exercises:\n");
        for ex in exercises {
            out.push_str(&format!(
                "- {} ({}, {}, {})\nInstructions: {}\n\n",
                ex.name,
                choice_label(&ex.body_part),
                choice_label(&ex.difficulty),
                choice_label(&ex.impact_level),
                ex.instructions
            ));
        }
        out.trim_end().to_string()
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: &Value) -> Result<T, serde_json::Error> {
    // Models sometimes send no args object at all.
    if args.is_null() {
        return serde_json::from_value(json!({}));
    }
    serde_json::from_value(args.clone())
}

/// Persona plus a summary of the caller's profile.
pub fn system_instruction(user: &User, profile: &Profile) -> String {
    let label = |v: Option<String>| v.unwrap_or_else(|| "N/A".to_string());
    format!(
        "{}\n\nYou are talking to {}.\nFitness goal: {}\nDiet: {} / {}\nExercise level: {}\n",
        SYSTEM_INSTRUCTION,
        user.username,
        label(profile.goal_selection.as_ref().map(choice_label)),
        label(profile.diet_selection.as_ref().map(choice_label)),
        label(profile.diet_preference.as_ref().map(choice_label)),
        profile
            .exercise_difficulty
            .as_ref()
            .map(choice_label)
            .unwrap_or_else(|| "beginner".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::choices::{Goal, PainArea};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const CATALOG: &str = r#"{
        "meals": [
            {"id": 1, "name": "Keto Omelette", "meal_type": "breakfast", "diet_selection": "keto",
             "cooking_time": "<10", "calories": 350},
            {"id": 2, "name": "Vegan Bowl", "meal_type": "lunch", "diet_selection": "no-diet",
             "diet_preference": "vegan", "cooking_time": "10-20", "calories": 500}
        ],
        "exercises": [
            {"id": 1, "name": "Glute Bridge", "body_part": "glutes", "exercise_type": "strength",
             "difficulty": "beginner", "impact_level": "low", "instructions": "Squeeze at the top",
             "duration_minutes": 5, "sets": 3, "reps": 15}
        ]
    }"#;

    /// Replays canned replies and records every history it was shown.
    struct ScriptedModel {
        replies: Mutex<VecDeque<ModelReply>>,
        seen: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<ModelReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(
            &self,
            _system_instruction: &str,
            history: &[ChatTurn],
            _tools: &[ToolDeclaration],
        ) -> Result<ModelReply, AssistantError> {
            self.seen.lock().unwrap().push(history.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(AssistantError::EmptyResponse)
        }
    }

    fn service(model: Arc<ScriptedModel>) -> ChatService {
        let catalog = Arc::new(CatalogService::load_from_json(CATALOG).unwrap());
        ChatService::new(model, catalog)
    }

    fn user() -> User {
        User {
            user_id: "u1".to_string(),
            username: "alex".to_string(),
            email: "alex@example.com".to_string(),
            password_hash: String::new(),
            phone_number: None,
            selected_plan: None,
            customer_id: None,
            created_at: String::new(),
        }
    }

    fn call(name: &str, args: Value) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    #[tokio::test]
    async fn test_plain_text_reply() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::Text("Hi!".into())]));
        let reply = service(model.clone())
            .reply(&user(), &Profile::default(), "hello")
            .await
            .unwrap();
        assert_eq!(reply, "Hi!");
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_feeds_result_back() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::FunctionCalls(vec![call("get_meals", json!({"diet_selection": "Keto"}))]),
            ModelReply::Text("Try the omelette.".into()),
        ]));
        let reply = service(model.clone())
            .reply(&user(), &Profile::default(), "breakfast ideas?")
            .await
            .unwrap();
        assert_eq!(reply, "Try the omelette.");

        let seen = model.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Model);
        match &second[2].parts[0] {
            ChatPart::FunctionResponse { name, result } => {
                assert_eq!(name, "get_meals");
                assert!(result.contains("Keto Omelette (breakfast, 350 cal)"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_loop_is_bounded() {
        let replies = (0..=MAX_TOOL_ROUNDS)
            .map(|_| ModelReply::FunctionCalls(vec![call("get_exercises", json!({}))]))
            .collect();
        let model = Arc::new(ScriptedModel::new(replies));
        let err = service(model)
            .reply(&user(), &Profile::default(), "loop")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::TooManyToolRounds(_)));
    }

    #[test]
    fn test_get_exercises_defaults() {
        let svc = service(Arc::new(ScriptedModel::new(vec![])));
        let out = svc.run_tool(&call("get_exercises", Value::Null));
        assert!(out.starts_with("Here are some exercises:"));
        assert!(out.contains("Glute Bridge (glutes, beginner, low)"));
        assert!(out.contains("Instructions: Squeeze at the top"));
    }

    #[test]
    fn test_tool_no_rows_messages() {
        let svc = service(Arc::new(ScriptedModel::new(vec![])));
        assert_eq!(
            svc.run_tool(&call("get_meals", json!({"meal_type": "dinner"}))),
            NO_MEALS
        );
        assert_eq!(
            svc.run_tool(&call("get_meals", json!({"diet_selection": "paleo"}))),
            NO_MEALS
        );
        assert_eq!(
            svc.run_tool(&call("get_exercises", json!({"difficulty": "Advanced"}))),
            NO_EXERCISES
        );
    }

    #[test]
    fn test_bad_arguments_become_tool_result() {
        let svc = service(Arc::new(ScriptedModel::new(vec![])));
        let out = svc.run_tool(&call("get_meals", json!({"meal_type": 7})));
        assert!(out.starts_with("Error fetching meals:"));
        assert!(svc.run_tool(&call("delete_user", json!({}))).starts_with("Unknown tool"));
    }

    #[test]
    fn test_system_instruction_includes_profile() {
        let profile = Profile {
            goal_selection: Some(Goal::MuscleGain),
            diet_selection: Some(DietSelection::Keto),
            pain_and_injury: vec![PainArea::Back],
            ..Default::default()
        };
        let text = system_instruction(&user(), &profile);
        assert!(text.starts_with("You are CUFITBot"));
        assert!(text.contains("You are talking to alex."));
        assert!(text.contains("Fitness goal: muscle-gain"));
        assert!(text.contains("Diet: keto / N/A"));
        assert!(text.contains("Exercise level: beginner"));
    }
}
