use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    quiz::models::{OptionKey, PLAYED_QUESTIONS, QUIZ_LENGTH},
    scoring::models::{FeedbackTier, grade_for_score},
    session::models::{Page, Session, SessionError},
};

/// The single action a page offers besides the globally available reset.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    GenerateQuiz,
    SubmitAnswer,
    NextQuestion,
    ViewResults,
    RestartQuiz,
}

#[derive(Debug, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub chosen_option: OptionKey,
    pub correct_option: OptionKey,
    /// Full option texts, present only when the choice was wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_text: Option<String>,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Start {
        student_name: String,
        control: Control,
    },
    Question {
        student_name: String,
        number: usize,
        total: usize,
        progress: f64,
        prompt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<BTreeMap<OptionKey, String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        verdict: Option<Verdict>,
        control: Control,
    },
    Results {
        student_name: String,
        correct_answers: u32,
        total_scored: usize,
        grade: f64,
        tier: FeedbackTier,
        message: &'static str,
        celebrate: bool,
        control: Control,
    },
}

impl PageView {
    /// Pure render of the session's current page. Never mutates the session,
    /// re-rendering an unanswered question changes nothing.
    pub fn from_session(session: &Session) -> Result<PageView, SessionError> {
        match session.page {
            Page::Start => Ok(PageView::Start {
                student_name: session.student_name.clone(),
                control: Control::GenerateQuiz,
            }),
            Page::Question { index, submitted } => {
                let question = session
                    .quiz
                    .as_ref()
                    .and_then(|quiz| quiz.question(index))
                    .ok_or(SessionError::NoActiveQuestion)?;

                let (options, verdict, control) = if submitted {
                    let chosen = session
                        .answers
                        .get(&index)
                        .copied()
                        .ok_or(SessionError::NotSubmitted)?;
                    let correct = question.is_correct(chosen);

                    let (chosen_text, correct_text) = if correct {
                        (None, None)
                    } else {
                        (
                            question.option_text(chosen).map(str::to_string),
                            question
                                .option_text(question.correct_option)
                                .map(str::to_string),
                        )
                    };

                    let control = if index < PLAYED_QUESTIONS - 1 {
                        Control::NextQuestion
                    } else {
                        Control::ViewResults
                    };

                    (
                        None,
                        Some(Verdict {
                            correct,
                            chosen_option: chosen,
                            correct_option: question.correct_option,
                            chosen_text,
                            correct_text,
                            explanation: question.explanation.clone(),
                        }),
                        control,
                    )
                } else {
                    (Some(question.options.clone()), None, Control::SubmitAnswer)
                };

                Ok(PageView::Question {
                    student_name: session.student_name.clone(),
                    number: index + 1,
                    total: QUIZ_LENGTH,
                    progress: index as f64 / QUIZ_LENGTH as f64,
                    prompt: question.prompt.clone(),
                    options,
                    verdict,
                    control,
                })
            }
            Page::Results => {
                let grade = grade_for_score(session.score);
                let tier = FeedbackTier::for_grade(grade);

                Ok(PageView::Results {
                    student_name: session.student_name.clone(),
                    correct_answers: session.score,
                    total_scored: PLAYED_QUESTIONS,
                    grade,
                    tier,
                    message: tier.message(),
                    celebrate: tier.celebrate(),
                    control: Control::RestartQuiz,
                })
            }
        }
    }
}
