//! Payloads de criação e atualização com validação
//!
//! Cada operação de escrita recebe um destes tipos; a validação roda antes de
//! qualquer insert, então dados fora do domínio nunca chegam ao banco.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Especie, StatusConsulta, StatusExame, StatusPrescricao};

/// Dados para cadastro de um pet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NovoPet {
    /// Tutor dono do pet
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    pub species: Especie,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Peso em quilogramas
    #[validate(range(min = 0.001, message = "Peso deve ser positivo"))]
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub microchip: Option<String>,
    pub notes: Option<String>,
}

/// Atualização parcial de um pet: apenas os campos presentes são gravados
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AtualizaPet {
    pub name: Option<String>,
    pub species: Option<Especie>,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[validate(range(min = 0.001, message = "Peso deve ser positivo"))]
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub microchip: Option<String>,
    pub notes: Option<String>,
}

/// Dados para agendamento de uma consulta
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NovaConsulta {
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    pub tutor_id: Uuid,
    pub data_consulta: DateTime<Utc>,
    #[validate(length(min = 1, message = "Motivo é obrigatório"))]
    pub motivo: String,
    pub sintomas: Option<String>,
    pub diagnostico: Option<String>,
    pub tratamento: Option<String>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub status: StatusConsulta,
}

/// Dados para registro de uma vacina aplicada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NovaVacina {
    pub pet_id: Uuid,
    #[validate(length(min = 1, message = "Nome da vacina é obrigatório"))]
    pub nome_vacina: String,
    pub data_aplicacao: NaiveDate,
    pub proxima_dose: Option<NaiveDate>,
    pub veterinario_id: Option<Uuid>,
    pub lote: Option<String>,
    pub fabricante: Option<String>,
    pub observacoes: Option<String>,
}

/// Dados para emissão de uma prescrição
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NovaPrescricao {
    pub consulta_id: Uuid,
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    #[validate(length(min = 1, message = "Medicamento é obrigatório"))]
    pub medicamento: String,
    #[validate(length(min = 1, message = "Dosagem é obrigatória"))]
    pub dosagem: String,
    #[validate(length(min = 1, message = "Frequência é obrigatória"))]
    pub frequencia: String,
    #[validate(length(min = 1, message = "Duração é obrigatória"))]
    pub duracao: String,
    pub instrucoes: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    #[serde(default)]
    pub status: StatusPrescricao,
}

/// Dados para solicitação de um exame
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NovoExame {
    pub consulta_id: Option<Uuid>,
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    #[validate(length(min = 1, message = "Tipo de exame é obrigatório"))]
    pub tipo_exame: String,
    pub data_exame: NaiveDate,
    pub resultado: Option<String>,
    pub arquivo_url: Option<String>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub status: StatusExame,
}
