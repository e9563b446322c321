//! Modelos de dados compartilhados entre aplicações
//!
//! Este módulo define as estruturas de dados principais usadas pelo ecossistema
//! do PetCuidado: perfis de usuário, pets e os registros clínicos (consultas,
//! vacinas, prescrições e exames), junto com as variantes "detalhadas" que
//! carregam as relações já resolvidas.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use tracing::warn;
use uuid::Uuid;

/// Papel de um usuário no sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Acesso irrestrito ao sistema
    Admin,
    /// Dono de pet, enxerga apenas os próprios registros
    Tutor,
    /// Profissional veterinário
    Veterinario,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Tutor => "tutor",
            UserRole::Veterinario => "veterinario",
        }
    }

    /// Interpreta o valor armazenado no banco. Valores desconhecidos caem no
    /// papel mais restritivo (tutor).
    pub fn from_db(valor: &str) -> UserRole {
        match valor {
            "admin" => UserRole::Admin,
            "tutor" => UserRole::Tutor,
            "veterinario" => UserRole::Veterinario,
            outro => {
                warn!(role = outro, "papel desconhecido no banco, tratando como tutor");
                UserRole::Tutor
            }
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Espécies atendidas pela clínica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Especie {
    Cao,
    Gato,
}

impl Especie {
    pub fn as_str(&self) -> &'static str {
        match self {
            Especie::Cao => "cao",
            Especie::Gato => "gato",
        }
    }

    pub fn parse(valor: &str) -> Option<Especie> {
        match valor {
            "cao" => Some(Especie::Cao),
            "gato" => Some(Especie::Gato),
            _ => None,
        }
    }
}

impl std::fmt::Display for Especie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status possíveis de uma consulta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusConsulta {
    /// Agendada, ainda não iniciada
    #[default]
    Agendada,
    /// Consulta em andamento
    EmAndamento,
    /// Consulta concluída
    Concluida,
    /// Cancelada
    Cancelada,
}

impl StatusConsulta {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusConsulta::Agendada => "agendada",
            StatusConsulta::EmAndamento => "em_andamento",
            StatusConsulta::Concluida => "concluida",
            StatusConsulta::Cancelada => "cancelada",
        }
    }

    pub fn parse(valor: &str) -> Option<StatusConsulta> {
        match valor {
            "agendada" => Some(StatusConsulta::Agendada),
            "em_andamento" => Some(StatusConsulta::EmAndamento),
            "concluida" => Some(StatusConsulta::Concluida),
            "cancelada" => Some(StatusConsulta::Cancelada),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusConsulta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status possíveis de uma prescrição
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPrescricao {
    /// Tratamento em curso
    #[default]
    Ativa,
    /// Tratamento encerrado
    Concluida,
    /// Suspensa pelo veterinário
    Suspensa,
}

impl StatusPrescricao {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusPrescricao::Ativa => "ativa",
            StatusPrescricao::Concluida => "concluida",
            StatusPrescricao::Suspensa => "suspensa",
        }
    }

    pub fn parse(valor: &str) -> Option<StatusPrescricao> {
        match valor {
            "ativa" => Some(StatusPrescricao::Ativa),
            "concluida" => Some(StatusPrescricao::Concluida),
            "suspensa" => Some(StatusPrescricao::Suspensa),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusPrescricao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status possíveis de um exame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusExame {
    /// Solicitado, aguardando realização
    #[default]
    Solicitado,
    /// Em andamento no laboratório
    EmAndamento,
    /// Resultado disponível
    Concluido,
}

impl StatusExame {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusExame::Solicitado => "solicitado",
            StatusExame::EmAndamento => "em_andamento",
            StatusExame::Concluido => "concluido",
        }
    }

    pub fn parse(valor: &str) -> Option<StatusExame> {
        match valor {
            "solicitado" => Some(StatusExame::Solicitado),
            "em_andamento" => Some(StatusExame::EmAndamento),
            "concluido" => Some(StatusExame::Concluido),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusExame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Erro de decodificação para valores de coluna fora do domínio esperado
fn valor_invalido(coluna: &str, valor: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: coluna.to_string(),
        source: Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Valor inválido para {}: {}", coluna, valor),
        )),
    }
}

/// Perfil de um usuário autenticado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identificador único (mesmo id do serviço de identidade)
    pub id: Uuid,
    pub email: String,
    /// Papel que governa a visibilidade de todos os demais registros
    pub role: UserRole,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pet cadastrado por um tutor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    /// Tutor dono do pet
    pub user_id: Uuid,
    pub name: String,
    pub species: Especie,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Peso em quilogramas, sempre positivo quando presente
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub microchip: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Consulta veterinária agendada ou realizada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consulta {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    pub tutor_id: Uuid,
    pub data_consulta: DateTime<Utc>,
    pub motivo: String,
    pub sintomas: Option<String>,
    pub diagnostico: Option<String>,
    pub tratamento: Option<String>,
    pub observacoes: Option<String>,
    pub status: StatusConsulta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registro de aplicação de vacina
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vacina {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub nome_vacina: String,
    pub data_aplicacao: NaiveDate,
    /// Data prevista para a próxima dose, quando houver reforço
    pub proxima_dose: Option<NaiveDate>,
    pub veterinario_id: Option<Uuid>,
    pub lote: Option<String>,
    pub fabricante: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prescrição de medicamento originada em uma consulta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescricao {
    pub id: Uuid,
    pub consulta_id: Uuid,
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    pub medicamento: String,
    pub dosagem: String,
    pub frequencia: String,
    pub duracao: String,
    pub instrucoes: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub status: StatusPrescricao,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exame laboratorial ou de imagem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exame {
    pub id: Uuid,
    /// Consulta de origem, quando o exame foi solicitado em atendimento
    pub consulta_id: Option<Uuid>,
    pub pet_id: Uuid,
    pub veterinario_id: Uuid,
    pub tipo_exame: String,
    pub data_exame: NaiveDate,
    pub resultado: Option<String>,
    pub arquivo_url: Option<String>,
    pub observacoes: Option<String>,
    pub status: StatusExame,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Consulta com as relações resolvidas (pet, veterinário e tutor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultaDetalhada {
    #[serde(flatten)]
    pub consulta: Consulta,
    pub pet: Pet,
    pub veterinario: UserProfile,
    pub tutor: UserProfile,
}

/// Vacina com as relações resolvidas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacinaDetalhada {
    #[serde(flatten)]
    pub vacina: Vacina,
    pub pet: Pet,
    pub veterinario: Option<UserProfile>,
}

/// Prescrição com as relações resolvidas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescricaoDetalhada {
    #[serde(flatten)]
    pub prescricao: Prescricao,
    pub consulta: Consulta,
    pub pet: Pet,
    pub veterinario: UserProfile,
}

/// Exame com as relações resolvidas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExameDetalhado {
    #[serde(flatten)]
    pub exame: Exame,
    pub consulta: Option<Consulta>,
    pub pet: Pet,
    pub veterinario: UserProfile,
}

// Leitores com prefixo de coluna. As consultas com join apelidam as colunas
// das relações como `pet__id`, `veterinario__name` etc., e estes leitores
// reconstroem cada entidade a partir do prefixo correspondente.

pub(crate) fn read_profile(row: &SqliteRow, prefixo: &str) -> sqlx::Result<UserProfile> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    let role_bruto: String = row.try_get(col("role").as_str())?;
    Ok(UserProfile {
        id: row.try_get(col("id").as_str())?,
        email: row.try_get(col("email").as_str())?,
        role: UserRole::from_db(&role_bruto),
        name: row.try_get(col("name").as_str())?,
        phone: row.try_get(col("phone").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

/// Variante para joins opcionais: todas as colunas vêm nulas quando a relação
/// não existe
pub(crate) fn read_profile_opcional(
    row: &SqliteRow,
    prefixo: &str,
) -> sqlx::Result<Option<UserProfile>> {
    let id: Option<Uuid> = row.try_get(format!("{prefixo}id").as_str())?;
    match id {
        Some(_) => Ok(Some(read_profile(row, prefixo)?)),
        None => Ok(None),
    }
}

pub(crate) fn read_pet(row: &SqliteRow, prefixo: &str) -> sqlx::Result<Pet> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    let especie_bruta: String = row.try_get(col("species").as_str())?;
    Ok(Pet {
        id: row.try_get(col("id").as_str())?,
        user_id: row.try_get(col("user_id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        species: Especie::parse(&especie_bruta)
            .ok_or_else(|| valor_invalido("species", &especie_bruta))?,
        breed: row.try_get(col("breed").as_str())?,
        birth_date: row.try_get(col("birth_date").as_str())?,
        weight: row.try_get(col("weight").as_str())?,
        color: row.try_get(col("color").as_str())?,
        microchip: row.try_get(col("microchip").as_str())?,
        notes: row.try_get(col("notes").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

pub(crate) fn read_consulta(row: &SqliteRow, prefixo: &str) -> sqlx::Result<Consulta> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    let status_bruto: String = row.try_get(col("status").as_str())?;
    Ok(Consulta {
        id: row.try_get(col("id").as_str())?,
        pet_id: row.try_get(col("pet_id").as_str())?,
        veterinario_id: row.try_get(col("veterinario_id").as_str())?,
        tutor_id: row.try_get(col("tutor_id").as_str())?,
        data_consulta: row.try_get(col("data_consulta").as_str())?,
        motivo: row.try_get(col("motivo").as_str())?,
        sintomas: row.try_get(col("sintomas").as_str())?,
        diagnostico: row.try_get(col("diagnostico").as_str())?,
        tratamento: row.try_get(col("tratamento").as_str())?,
        observacoes: row.try_get(col("observacoes").as_str())?,
        status: StatusConsulta::parse(&status_bruto)
            .ok_or_else(|| valor_invalido("status", &status_bruto))?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

pub(crate) fn read_consulta_opcional(
    row: &SqliteRow,
    prefixo: &str,
) -> sqlx::Result<Option<Consulta>> {
    let id: Option<Uuid> = row.try_get(format!("{prefixo}id").as_str())?;
    match id {
        Some(_) => Ok(Some(read_consulta(row, prefixo)?)),
        None => Ok(None),
    }
}

pub(crate) fn read_vacina(row: &SqliteRow, prefixo: &str) -> sqlx::Result<Vacina> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    Ok(Vacina {
        id: row.try_get(col("id").as_str())?,
        pet_id: row.try_get(col("pet_id").as_str())?,
        nome_vacina: row.try_get(col("nome_vacina").as_str())?,
        data_aplicacao: row.try_get(col("data_aplicacao").as_str())?,
        proxima_dose: row.try_get(col("proxima_dose").as_str())?,
        veterinario_id: row.try_get(col("veterinario_id").as_str())?,
        lote: row.try_get(col("lote").as_str())?,
        fabricante: row.try_get(col("fabricante").as_str())?,
        observacoes: row.try_get(col("observacoes").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

pub(crate) fn read_prescricao(row: &SqliteRow, prefixo: &str) -> sqlx::Result<Prescricao> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    let status_bruto: String = row.try_get(col("status").as_str())?;
    Ok(Prescricao {
        id: row.try_get(col("id").as_str())?,
        consulta_id: row.try_get(col("consulta_id").as_str())?,
        pet_id: row.try_get(col("pet_id").as_str())?,
        veterinario_id: row.try_get(col("veterinario_id").as_str())?,
        medicamento: row.try_get(col("medicamento").as_str())?,
        dosagem: row.try_get(col("dosagem").as_str())?,
        frequencia: row.try_get(col("frequencia").as_str())?,
        duracao: row.try_get(col("duracao").as_str())?,
        instrucoes: row.try_get(col("instrucoes").as_str())?,
        data_inicio: row.try_get(col("data_inicio").as_str())?,
        data_fim: row.try_get(col("data_fim").as_str())?,
        status: StatusPrescricao::parse(&status_bruto)
            .ok_or_else(|| valor_invalido("status", &status_bruto))?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

pub(crate) fn read_exame(row: &SqliteRow, prefixo: &str) -> sqlx::Result<Exame> {
    let col = |nome: &str| format!("{prefixo}{nome}");
    let status_bruto: String = row.try_get(col("status").as_str())?;
    Ok(Exame {
        id: row.try_get(col("id").as_str())?,
        consulta_id: row.try_get(col("consulta_id").as_str())?,
        pet_id: row.try_get(col("pet_id").as_str())?,
        veterinario_id: row.try_get(col("veterinario_id").as_str())?,
        tipo_exame: row.try_get(col("tipo_exame").as_str())?,
        data_exame: row.try_get(col("data_exame").as_str())?,
        resultado: row.try_get(col("resultado").as_str())?,
        arquivo_url: row.try_get(col("arquivo_url").as_str())?,
        observacoes: row.try_get(col("observacoes").as_str())?,
        status: StatusExame::parse(&status_bruto)
            .ok_or_else(|| valor_invalido("status", &status_bruto))?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

impl FromRow<'_, SqliteRow> for UserProfile {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_profile(row, "")
    }
}

impl FromRow<'_, SqliteRow> for Pet {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_pet(row, "")
    }
}

impl FromRow<'_, SqliteRow> for Consulta {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_consulta(row, "")
    }
}

impl FromRow<'_, SqliteRow> for Vacina {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_vacina(row, "")
    }
}

impl FromRow<'_, SqliteRow> for Prescricao {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_prescricao(row, "")
    }
}

impl FromRow<'_, SqliteRow> for Exame {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        read_exame(row, "")
    }
}

impl FromRow<'_, SqliteRow> for ConsultaDetalhada {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            consulta: read_consulta(row, "")?,
            pet: read_pet(row, "pet__")?,
            veterinario: read_profile(row, "veterinario__")?,
            tutor: read_profile(row, "tutor__")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for VacinaDetalhada {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            vacina: read_vacina(row, "")?,
            pet: read_pet(row, "pet__")?,
            veterinario: read_profile_opcional(row, "veterinario__")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for PrescricaoDetalhada {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            prescricao: read_prescricao(row, "")?,
            consulta: read_consulta(row, "consulta__")?,
            pet: read_pet(row, "pet__")?,
            veterinario: read_profile(row, "veterinario__")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for ExameDetalhado {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            exame: read_exame(row, "")?,
            consulta: read_consulta_opcional(row, "consulta__")?,
            pet: read_pet(row, "pet__")?,
            veterinario: read_profile(row, "veterinario__")?,
        })
    }
}
