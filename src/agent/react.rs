//! ReAct prompt and output parsing
//!
//! The model works in Thought / Action / Action Input / Observation turns
//! and ends with a `Final Answer:` line. This module renders the prompts
//! and turns raw completions into the next step.

use crate::agent::toolkit::ToolSpec;
use crate::error::{Result, SqlChatError};

/// Marker that ends the loop
pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const ACTION_WORD: &str = "Action";
const INPUT_WORD: &str = "Input";

/// Generation stops before the model invents its own observation
pub const STOP_SEQUENCES: &[&str] = &["\nObservation:", "\n\tObservation:"];

/// Answer returned when the step budget runs out
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// What the model decided to do next
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Call a tool
    Action {
        tool: String,
        input: String,
        /// Raw model text for this step
        log: String,
    },
    /// Stop with an answer
    Finish { answer: String, log: String },
}

/// A completed tool call, kept in the scratchpad
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    pub tool: String,
    pub input: String,
    pub log: String,
    pub observation: String,
}

/// Parse one model completion
pub fn parse_output(text: &str) -> Result<AgentStep> {
    let includes_answer = text.contains(FINAL_ANSWER_ACTION);

    match find_action(text)? {
        Some(_) if includes_answer => Err(malformed(
            "Parsing LLM output produced both a final answer and a parse-able action",
            text,
        )),
        Some((tool, input)) => Ok(AgentStep::Action {
            tool,
            input,
            log: text.trim_end().to_string(),
        }),
        None if includes_answer => {
            let answer = text
                .rsplit(FINAL_ANSWER_ACTION)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Ok(AgentStep::Finish {
                answer,
                log: text.trim_end().to_string(),
            })
        }
        None => Err(malformed("Could not parse LLM output", text)),
    }
}

/// Locate an `Action:` label followed by an `Action Input:` label
///
/// Labels may carry a step number and loose spacing (`Action 1 :`).
/// `Ok(None)` unless both labels are present in that order.
fn find_action(text: &str) -> Result<Option<(String, String)>> {
    let Some((_, tool_start)) = find_label(text, 0, &[ACTION_WORD]) else {
        return Ok(None);
    };
    let Some((input_label, input_start)) = find_label(text, tool_start, &[ACTION_WORD, INPUT_WORD])
    else {
        return Ok(None);
    };

    let tool = text[tool_start..input_label]
        .trim()
        .trim_matches('`')
        .trim()
        .to_string();
    if tool.is_empty() {
        return Err(malformed("Invalid Format: empty 'Action:'", text));
    }

    let mut input = &text[input_start..];
    if let Some(end) = input.find("\nObservation") {
        input = &input[..end];
    }
    let input = input.trim().trim_matches('"').to_string();

    Ok(Some((tool, input)))
}

/// First label made of `words` at or after `from`, as (label start, end after the colon)
fn find_label(text: &str, from: usize, words: &[&str]) -> Option<(usize, usize)> {
    text[from..]
        .match_indices(words[0])
        .map(|(at, _)| from + at)
        .find_map(|at| label_end(text, at, words).map(|end| (at, end)))
}

/// Each word may be followed by whitespace and a step number; the label ends at `:`
fn label_end(text: &str, at: usize, words: &[&str]) -> Option<usize> {
    let mut rest = &text[at..];
    for word in words {
        rest = rest.trim_start().strip_prefix(word)?;
        rest = rest
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_digit());
    }
    rest = rest.trim_start().strip_prefix(':')?;
    Some(text.len() - rest.len())
}

fn malformed(reason: &str, text: &str) -> SqlChatError {
    SqlChatError::upstream("agent", format!("{}: `{}`", reason, text.trim()))
}

/// System prompt: role, rules, schema context, tools and turn format
pub fn system_prompt(dialect: &str, top_k: usize, schema: &str, tools: &[ToolSpec]) -> String {
    let tool_lines: Vec<String> = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect();
    let tool_names: Vec<&str> = tools.iter().map(|t| t.name).collect();

    format!(
        "You are an agent designed to interact with a SQL database.\n\
Given an input question, create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer.\n\
Unless the user specifies a specific number of examples they wish to obtain, always limit your query to at most {top_k} results.\n\
You can order the results by a relevant column to return the most interesting examples in the database.\n\
Never query for all the columns from a specific table, only ask for the relevant columns given the question.\n\
Only use the tools below, and only use the information they return to construct your final answer.\n\
You MUST double check your query before executing it. A query that fails to execute ends the conversation with an error.\n\
\n\
DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the database.\n\
\n\
If the question does not seem related to the database, just return \"I don't know\" as the answer.\n\
\n\
Database schema:\n\
{schema}\n\
\n\
{tools}\n\
\n\
Use the following format:\n\
\n\
Question: the input question you must answer\n\
Thought: you should always think about what to do\n\
Action: the action to take, should be one of [{names}]\n\
Action Input: the input to the action\n\
Observation: the result of the action\n\
... (this Thought/Action/Action Input/Observation can repeat N times)\n\
Thought: I now know the final answer\n\
Final Answer: the final answer to the original input question",
        dialect = dialect,
        top_k = top_k,
        schema = schema.trim_end(),
        tools = tool_lines.join("\n"),
        names = tool_names.join(", "),
    )
}

/// User turn: the question followed by every step taken so far
pub fn user_prompt(question: &str, steps: &[AgentAction]) -> String {
    let mut prompt = format!("Begin!\n\nQuestion: {}\nThought:", question.trim());
    for step in steps {
        prompt.push(' ');
        prompt.push_str(step.log.trim());
        prompt.push_str("\nObservation: ");
        prompt.push_str(step.observation.trim_end());
        prompt.push_str("\nThought:");
    }
    prompt
}
