use std::{collections::BTreeMap, sync::Arc, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    client::gemini_client::{GeminiClientError, GenerateContent},
    quiz::models::{OptionKey, QUIZ_LENGTH, Question, Quiz},
};

const QUIZ_PROMPT: &str = r#"
Actúa como un matemático experto en álgebra lineal y un excelente pedagogo.
Tu tarea es crear un quiz de 10 preguntas de nivel intermedio/avanzado sobre razonamiento lógico en álgebra lineal.
No te enfoques solo en cálculos mecánicos, sino en la interpretación de conceptos clave.
Los temas deben incluir: espacios vectoriales, transformaciones lineales, independencia lineal,
valores y vectores propios, significado geométrico de los determinantes, formas canónicas elementales y espacios con producto interior.

Cada pregunta debe tener 4 opciones de respuesta (A, B, C, D).
Usa código LaTeX para las fórmulas pero asegúrate de colocar el signo dólar ($) antes y después de la fórmula y que sea 100% compatible con JSON (para evitar errores de escape).

Devuelve el resultado ÚNICAMENTE en formato JSON válido. No incluyas texto, explicaciones o ```json```
antes o después del propio objeto JSON. El JSON debe ser una lista de 10 objetos.

Cada objeto en la lista debe tener exactamente las siguientes claves:
- "pregunta": (string) El texto de la pregunta.
- "opciones": (dict) Un diccionario con claves "A", "B", "C", "D" y sus respectivos textos como valores.
- "respuesta_correcta": (string) La letra de la opción correcta (e.g., "C").
- "explicacion": (string) Una explicación clara y concisa de por qué la respuesta es correcta y, si es posible, por qué las otras son incorrectas.

Ejemplo de un objeto en la lista:
{
    "pregunta": "¿Qué representa el determinante de una matriz 2x2 en un contexto geométrico?",
    "opciones": {
        "A": "La longitud del vector más largo de la matriz.",
        "B": "El área del paralelogramo formado por los vectores columna de la matriz.",
        "C": "La suma de los elementos de la diagonal.",
        "D": "El ángulo entre los dos vectores columna."
    },
    "respuesta_correcta": "B",
    "explicacion": "El valor absoluto del determinante de una matriz 2x2 representa el factor de escala del área de una transformación lineal. Específicamente, es el área del paralelogramo definido por los vectores columna de la matriz."
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Model request failed: {0}")]
    Client(#[from] GeminiClientError),

    #[error("Model returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned a malformed quiz: {0}")]
    Malformed(String),

    #[error("Quiz generation failed after {0} attempts")]
    Exhausted(u32),
}

/// Bounded retry schedule for quiz generation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Wire format the model is instructed to produce.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    pregunta: String,
    opciones: BTreeMap<String, String>,
    respuesta_correcta: String,
    explicacion: String,
}

pub struct QuizGenerator {
    backend: Arc<dyn GenerateContent>,
    retry: RetryPolicy,
}

impl QuizGenerator {
    pub fn new(backend: Arc<dyn GenerateContent>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Runs generation attempts until a valid quiz comes back or all
    /// attempts are used. Transport, parse and validation failures all
    /// consume one attempt each.
    pub async fn generate_quiz(&self) -> Result<Quiz, GenerationError> {
        for attempt in 1..=self.retry.max_attempts {
            match self.attempt().await {
                Ok(quiz) => {
                    info!("Quiz generated on attempt {}", attempt);
                    return Ok(quiz);
                }
                Err(e) => {
                    warn!("Quiz generation attempt {} failed: {}", attempt, e);
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        Err(GenerationError::Exhausted(self.retry.max_attempts))
    }

    async fn attempt(&self) -> Result<Quiz, GenerationError> {
        let payload = self.backend.generate(QUIZ_PROMPT).await?;
        parse_quiz(&payload)
    }
}

/// Models tend to wrap JSON payloads in markdown fences despite being told
/// not to. Strip the markers before parsing.
fn strip_code_fences(payload: &str) -> String {
    payload
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn parse_quiz(payload: &str) -> Result<Quiz, GenerationError> {
    let cleaned = strip_code_fences(payload);
    let raw: Vec<RawQuestion> = serde_json::from_str(&cleaned)?;

    if raw.len() != QUIZ_LENGTH {
        return Err(GenerationError::Malformed(format!(
            "expected {} questions, got {}",
            QUIZ_LENGTH,
            raw.len()
        )));
    }

    let questions = raw
        .into_iter()
        .map(validate_question)
        .collect::<Result<Vec<Question>, GenerationError>>()?;

    Ok(Quiz::new(questions))
}

fn validate_question(raw: RawQuestion) -> Result<Question, GenerationError> {
    if raw.pregunta.trim().is_empty() {
        return Err(GenerationError::Malformed("question text is empty".into()));
    }

    let mut options = BTreeMap::new();
    for (letter, text) in raw.opciones {
        let Some(key) = OptionKey::from_letter(&letter) else {
            return Err(GenerationError::Malformed(format!(
                "unknown option letter: {letter}"
            )));
        };
        options.insert(key, text);
    }

    if options.len() != 4 {
        return Err(GenerationError::Malformed(format!(
            "expected 4 options, got {}",
            options.len()
        )));
    }

    let Some(correct_option) = OptionKey::from_letter(&raw.respuesta_correcta) else {
        return Err(GenerationError::Malformed(format!(
            "correct answer is not an option letter: {}",
            raw.respuesta_correcta
        )));
    };

    Ok(Question {
        prompt: raw.pregunta,
        options,
        correct_option,
        explanation: raw.explicacion,
    })
}
