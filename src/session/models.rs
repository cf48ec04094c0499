use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::quiz::models::{OptionKey, PLAYED_QUESTIONS, Quiz};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Debes ingresar un nombre para continuar")]
    EmptyName,

    #[error("A quiz is already in progress for this session")]
    QuizInProgress,

    #[error("No question is active for this session")]
    NoActiveQuestion,

    #[error("An answer was already submitted for this question")]
    AlreadySubmitted,

    #[error("No answer has been submitted for this question")]
    NotSubmitted,

    #[error("All questions have been played")]
    EndOfQuiz,

    #[error("The quiz is not finished yet")]
    QuizUnfinished,
}

/// The page a session is currently on. The quiz page carries which question
/// is active and whether its answer has been submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Start,
    Question { index: usize, submitted: bool },
    Results,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub student_name: String,
    pub quiz: Option<Quiz>,
    pub page: Page,
    pub answers: HashMap<usize, OptionKey>,
    pub score: u32,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            student_name: String::new(),
            quiz: None,
            page: Page::Start,
            answers: HashMap::new(),
            score: 0,
            last_active: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn last_played_index() -> usize {
        PLAYED_QUESTIONS - 1
    }

    /// The name must be non-empty once trimmed. Validated before any
    /// generation attempt is made.
    pub fn set_student_name(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        self.student_name = name.to_string();
        Ok(())
    }

    /// Start page -> first question. The quiz is fixed for the rest of the
    /// session lifetime.
    pub fn begin(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        if !matches!(self.page, Page::Start) {
            return Err(SessionError::QuizInProgress);
        }

        self.quiz = Some(quiz);
        self.answers.clear();
        self.score = 0;
        self.page = Page::Question {
            index: 0,
            submitted: false,
        };
        Ok(())
    }

    /// Records the choice for the active question and scores it. Guarded so
    /// a second submission can change neither the recorded answer nor the
    /// score.
    pub fn submit_answer(&mut self, choice: OptionKey) -> Result<bool, SessionError> {
        let Page::Question { index, submitted } = self.page else {
            return Err(SessionError::NoActiveQuestion);
        };
        if submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        let Some(question) = self.quiz.as_ref().and_then(|quiz| quiz.question(index)) else {
            return Err(SessionError::NoActiveQuestion);
        };

        let correct = question.is_correct(choice);
        self.answers.insert(index, choice);
        if correct {
            self.score += 1;
        }

        self.page = Page::Question {
            index,
            submitted: true,
        };
        Ok(correct)
    }

    /// Moves on to the next question. Past the last played question the
    /// only way forward is [`Session::finish`].
    pub fn advance(&mut self) -> Result<(), SessionError> {
        let Page::Question { index, submitted } = self.page else {
            return Err(SessionError::NoActiveQuestion);
        };
        if !submitted {
            return Err(SessionError::NotSubmitted);
        }
        if index >= Self::last_played_index() {
            return Err(SessionError::EndOfQuiz);
        }

        self.page = Page::Question {
            index: index + 1,
            submitted: false,
        };
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), SessionError> {
        let Page::Question { index, submitted } = self.page else {
            return Err(SessionError::NoActiveQuestion);
        };
        if !submitted {
            return Err(SessionError::NotSubmitted);
        }
        if index < Self::last_played_index() {
            return Err(SessionError::QuizUnfinished);
        }

        self.page = Page::Results;
        Ok(())
    }

    /// Post-results restart, keeps the student name.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if !matches!(self.page, Page::Results) {
            return Err(SessionError::QuizUnfinished);
        }

        let name = std::mem::take(&mut self.student_name);
        *self = Self::new(self.id);
        self.student_name = name;
        Ok(())
    }

    /// Unconditional reset, clears everything including the name.
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::quiz::models::{QUIZ_LENGTH, Question};

    use super::*;

    fn sample_quiz() -> Quiz {
        let questions = (0..QUIZ_LENGTH)
            .map(|i| Question {
                prompt: format!("Pregunta {}", i + 1),
                options: BTreeMap::from([
                    (OptionKey::A, "a".to_string()),
                    (OptionKey::B, "b".to_string()),
                    (OptionKey::C, "c".to_string()),
                    (OptionKey::D, "d".to_string()),
                ]),
                correct_option: OptionKey::B,
                explanation: "Porque sí".to_string(),
            })
            .collect();

        Quiz::new(questions)
    }

    fn started_session() -> Session {
        let mut session = Session::new(Uuid::new_v4());
        session.set_student_name("Ana").unwrap();
        session.begin(sample_quiz()).unwrap();
        session
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut session = Session::new(Uuid::new_v4());
        assert!(matches!(
            session.set_student_name("   "),
            Err(SessionError::EmptyName)
        ));
        assert!(session.student_name.is_empty());
    }

    #[test]
    fn begin_requires_start_page() {
        let mut session = started_session();
        assert!(matches!(
            session.begin(sample_quiz()),
            Err(SessionError::QuizInProgress)
        ));
    }

    #[test]
    fn correct_answer_scores_one() {
        let mut session = started_session();

        let correct = session.submit_answer(OptionKey::B).unwrap();
        assert!(correct);
        assert_eq!(session.score, 1);
        assert_eq!(session.answers.get(&0), Some(&OptionKey::B));
        assert_eq!(
            session.page,
            Page::Question {
                index: 0,
                submitted: true
            }
        );
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let mut session = started_session();

        let correct = session.submit_answer(OptionKey::C).unwrap();
        assert!(!correct);
        assert_eq!(session.score, 0);
        assert_eq!(session.answers.get(&0), Some(&OptionKey::C));
    }

    #[test]
    fn double_submit_is_a_no_op() {
        let mut session = started_session();
        session.submit_answer(OptionKey::B).unwrap();

        let result = session.submit_answer(OptionKey::C);
        assert!(matches!(result, Err(SessionError::AlreadySubmitted)));
        assert_eq!(session.score, 1);
        assert_eq!(session.answers.get(&0), Some(&OptionKey::B));
    }

    #[test]
    fn advance_requires_submission() {
        let mut session = started_session();
        assert!(matches!(session.advance(), Err(SessionError::NotSubmitted)));
    }

    #[test]
    fn advance_stops_at_last_played_question() {
        let mut session = started_session();

        for expected in 0..PLAYED_QUESTIONS - 1 {
            assert_eq!(
                session.page,
                Page::Question {
                    index: expected,
                    submitted: false
                }
            );
            session.submit_answer(OptionKey::B).unwrap();
            session.advance().unwrap();
        }

        session.submit_answer(OptionKey::B).unwrap();
        assert!(matches!(session.advance(), Err(SessionError::EndOfQuiz)));

        session.finish().unwrap();
        assert_eq!(session.page, Page::Results);
        assert_eq!(session.score, PLAYED_QUESTIONS as u32);
    }

    #[test]
    fn finish_requires_last_question() {
        let mut session = started_session();
        session.submit_answer(OptionKey::B).unwrap();
        assert!(matches!(session.finish(), Err(SessionError::QuizUnfinished)));
    }

    #[test]
    fn restart_keeps_the_name() {
        let mut session = started_session();
        for _ in 0..PLAYED_QUESTIONS - 1 {
            session.submit_answer(OptionKey::B).unwrap();
            session.advance().unwrap();
        }
        session.submit_answer(OptionKey::B).unwrap();
        session.finish().unwrap();

        session.restart().unwrap();
        assert_eq!(session.student_name, "Ana");
        assert_eq!(session.page, Page::Start);
        assert_eq!(session.score, 0);
        assert!(session.answers.is_empty());
        assert!(session.quiz.is_none());
    }

    #[test]
    fn restart_only_from_results() {
        let mut session = started_session();
        assert!(matches!(
            session.restart(),
            Err(SessionError::QuizUnfinished)
        ));
    }

    #[test]
    fn reset_clears_the_name() {
        let mut session = started_session();
        session.reset();
        assert!(session.student_name.is_empty());
        assert_eq!(session.page, Page::Start);
        assert!(session.quiz.is_none());
    }
}
