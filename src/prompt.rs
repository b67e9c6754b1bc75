//! 交互提示：
//! - `Prompter` 抽象输入/单选/确认三类问题
//! - `TerminalPrompter` 基于 dialoguer
//! - `DefaultsPrompter` 用于非交互模式：直接采用默认值，缺少必填项时报错并指出对应参数

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tracing::debug;

use crate::error::{GalaxyError, GalaxyResult};

/// 输入校验回调（与 `validation` 模块中的函数签名一致）
pub(crate) type Validator = fn(&str) -> Result<(), String>;

/// 文本输入问题
#[derive(Debug, Clone)]
pub(crate) struct InputQuestion {
    pub(crate) prompt: String,
    pub(crate) default: Option<String>,
    pub(crate) allow_empty: bool,
    pub(crate) validate: Option<Validator>,
    /// 非交互模式下可替代该问题的命令行参数
    pub(crate) flag: Option<&'static str>,
}

impl InputQuestion {
    pub(crate) fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), default: None, allow_empty: false, validate: None, flag: None }
    }

    pub(crate) fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub(crate) fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub(crate) fn validate(mut self, f: Validator) -> Self {
        self.validate = Some(f);
        self
    }

    pub(crate) fn flag(mut self, flag: &'static str) -> Self {
        self.flag = Some(flag);
        self
    }

    fn check(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return if self.allow_empty { Ok(()) } else { Err(format!("{} is required", self.prompt)) };
        }
        match self.validate {
            Some(f) => f(value),
            None => Ok(()),
        }
    }
}

pub(crate) trait Prompter {
    fn input(&mut self, question: &InputQuestion) -> GalaxyResult<String>;
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> GalaxyResult<usize>;
    fn confirm(&mut self, prompt: &str, default: bool) -> GalaxyResult<bool>;
}

/// 按运行模式选择实现
pub(crate) fn prompter(non_interactive: bool) -> Box<dyn Prompter> {
    if non_interactive {
        debug!("prompts answered with defaults");
        Box::new(DefaultsPrompter)
    } else {
        Box::new(TerminalPrompter::new())
    }
}

pub(crate) struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub(crate) fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

fn prompt_error(e: dialoguer::Error) -> GalaxyError {
    GalaxyError::PreconditionFailed(format!("Prompt failed: {}", e))
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, question: &InputQuestion) -> GalaxyResult<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(question.prompt.as_str())
            .allow_empty(question.allow_empty);
        if let Some(default) = &question.default {
            input = input.default(default.clone());
        }
        let q = question.clone();
        let value = input
            .validate_with(move |s: &String| q.check(s.trim()))
            .interact_text()
            .map_err(prompt_error)?;
        Ok(value.trim().to_string())
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> GalaxyResult<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> GalaxyResult<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}

/// 非交互：全部采用默认值
pub(crate) struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn input(&mut self, question: &InputQuestion) -> GalaxyResult<String> {
        let value = match &question.default {
            Some(default) => default.clone(),
            None if question.allow_empty => String::new(),
            None => {
                let hint = match question.flag {
                    Some(flag) => format!(" (pass {})", flag),
                    None => String::new(),
                };
                return Err(GalaxyError::PreconditionFailed(format!(
                    "'{}' needs an answer in non-interactive mode{}",
                    question.prompt, hint
                )));
            }
        };
        question.check(&value).map_err(GalaxyError::InvalidInput)?;
        debug!(prompt = %question.prompt, value = %value, "using default answer");
        Ok(value)
    }

    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> GalaxyResult<usize> {
        debug!(prompt, choice = ?items.get(default), "using default choice");
        Ok(default)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> GalaxyResult<bool> {
        debug!(prompt, default, "using default confirmation");
        Ok(default)
    }
}

/// 测试用：按顺序回放预设答案，用尽后退回默认值
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Clone)]
    pub(crate) enum Answer {
        Text(&'static str),
        Choice(usize),
        Yes(bool),
    }

    pub(crate) struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        pub(crate) asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub(crate) fn new(answers: Vec<Answer>) -> Self {
            Self { answers: answers.into(), asked: Vec::new() }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&mut self, question: &InputQuestion) -> GalaxyResult<String> {
            self.asked.push(question.prompt.clone());
            match self.answers.pop_front() {
                Some(Answer::Text(s)) => {
                    question.check(s).map_err(GalaxyError::InvalidInput)?;
                    Ok(s.to_string())
                }
                Some(other) => panic!("expected text answer for '{}', got {:?}", question.prompt, other),
                None => DefaultsPrompter.input(question),
            }
        }

        fn select(&mut self, prompt: &str, items: &[String], default: usize) -> GalaxyResult<usize> {
            self.asked.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Choice(i)) => {
                    assert!(i < items.len(), "choice {} out of range for '{}'", i, prompt);
                    Ok(i)
                }
                Some(other) => panic!("expected choice for '{}', got {:?}", prompt, other),
                None => Ok(default),
            }
        }

        fn confirm(&mut self, prompt: &str, default: bool) -> GalaxyResult<bool> {
            self.asked.push(prompt.to_string());
            match self.answers.pop_front() {
                Some(Answer::Yes(b)) => Ok(b),
                Some(other) => panic!("expected confirmation for '{}', got {:?}", prompt, other),
                None => Ok(default),
            }
        }
    }
}
