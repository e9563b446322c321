//! Camada de consultas com escopo por papel
//!
//! Uma operação de listagem por tipo de entidade, todas com a mesma forma:
//! parâmetros de escopo opcionais (pet dono do registro, usuário participante)
//! e relações declaradas já resolvidas no resultado. Os parâmetros de escopo
//! são fornecidos pelo chamador; a aplicação das regras de visibilidade por
//! papel fica em [`crate::scope::ScopedAccess`].

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::DbError;
use crate::models::{
    Consulta, ConsultaDetalhada, Exame, ExameDetalhado, Pet, Prescricao, PrescricaoDetalhada,
    UserProfile, Vacina, VacinaDetalhada,
};
use crate::validations::{
    AtualizaPet, NovaConsulta, NovaPrescricao, NovaVacina, NovoExame, NovoPet,
};

const PROFILE_COLS: &[&str] = &["id", "email", "role", "name", "phone", "created_at", "updated_at"];

const PET_COLS: &[&str] = &[
    "id", "user_id", "name", "species", "breed", "birth_date", "weight", "color", "microchip",
    "notes", "created_at", "updated_at",
];

const CONSULTA_COLS: &[&str] = &[
    "id", "pet_id", "veterinario_id", "tutor_id", "data_consulta", "motivo", "sintomas",
    "diagnostico", "tratamento", "observacoes", "status", "created_at", "updated_at",
];

/// Projeta as colunas de uma relação com alias prefixado (`pet__id`,
/// `veterinario__name`, ...), casando com os leitores de `models`
fn colunas_prefixadas(alias: &str, prefixo: &str, colunas: &[&str]) -> String {
    colunas
        .iter()
        .map(|coluna| format!("{alias}.{coluna} AS {prefixo}{coluna}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lista pets, opcionalmente restritos a um tutor. A ausência do filtro é
/// reservada a chamadores com papel admin. Ordenado do cadastro mais recente
/// para o mais antigo.
pub async fn list_pets(pool: &SqlitePool, owner_user_id: Option<Uuid>) -> Result<Vec<Pet>, DbError> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM pets WHERE 1 = 1");
    if let Some(tutor) = owner_user_id {
        query.push(" AND user_id = ").push_bind(tutor);
    }
    query.push(" ORDER BY datetime(created_at) DESC, id");
    let pets = query.build_query_as::<Pet>().fetch_all(pool).await?;
    Ok(pets)
}

/// Busca um pet pelo id. Falha com `NotFound` quando não existe.
pub async fn get_pet_by_id(pool: &SqlitePool, id: Uuid) -> Result<Pet, DbError> {
    let pet = sqlx::query_as::<_, Pet>("SELECT * FROM pets WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(pet)
}

/// Cadastra um pet e devolve a linha armazenada, com id e timestamps gerados
pub async fn create_pet(pool: &SqlitePool, novo: &NovoPet) -> Result<Pet, DbError> {
    novo.validate()?;
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO pets (id, user_id, name, species, breed, birth_date, weight, color, microchip, notes) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(novo.user_id)
    .bind(&novo.name)
    .bind(novo.species.as_str())
    .bind(&novo.breed)
    .bind(novo.birth_date)
    .bind(novo.weight)
    .bind(&novo.color)
    .bind(&novo.microchip)
    .bind(&novo.notes)
    .execute(pool)
    .await?;

    get_pet_by_id(pool, id).await
}

/// Atualização parcial: grava apenas os campos presentes e carimba
/// `updated_at` com o instante atual
pub async fn update_pet(pool: &SqlitePool, id: Uuid, atualiza: &AtualizaPet) -> Result<Pet, DbError> {
    atualiza.validate()?;
    let resultado = sqlx::query(
        "UPDATE pets SET \
            name = COALESCE(?, name), \
            species = COALESCE(?, species), \
            breed = COALESCE(?, breed), \
            birth_date = COALESCE(?, birth_date), \
            weight = COALESCE(?, weight), \
            color = COALESCE(?, color), \
            microchip = COALESCE(?, microchip), \
            notes = COALESCE(?, notes), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&atualiza.name)
    .bind(atualiza.species.map(|especie| especie.as_str()))
    .bind(&atualiza.breed)
    .bind(atualiza.birth_date)
    .bind(atualiza.weight)
    .bind(&atualiza.color)
    .bind(&atualiza.microchip)
    .bind(&atualiza.notes)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if resultado.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("Pet {} não encontrado", id)));
    }
    get_pet_by_id(pool, id).await
}

/// Remove um pet. Não há remoção em cascata: registros clínicos dependentes
/// bloqueiam a exclusão com violação de restrição.
pub async fn delete_pet(pool: &SqlitePool, id: Uuid) -> Result<(), DbError> {
    sqlx::query("DELETE FROM pets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Lista consultas com pet, veterinário e tutor resolvidos.
///
/// `participant_user_id` casa tanto o tutor quanto o veterinário da consulta
/// (união, sem duplicatas). Ordenado da consulta mais recente para a mais
/// antiga.
pub async fn list_consultas(
    pool: &SqlitePool,
    pet_id: Option<Uuid>,
    participant_user_id: Option<Uuid>,
) -> Result<Vec<ConsultaDetalhada>, DbError> {
    let select = format!(
        "SELECT c.*, {}, {}, {} FROM consultas c \
         JOIN pets p ON p.id = c.pet_id \
         JOIN profiles v ON v.id = c.veterinario_id \
         JOIN profiles t ON t.id = c.tutor_id \
         WHERE 1 = 1",
        colunas_prefixadas("p", "pet__", PET_COLS),
        colunas_prefixadas("v", "veterinario__", PROFILE_COLS),
        colunas_prefixadas("t", "tutor__", PROFILE_COLS),
    );
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    if let Some(pet) = pet_id {
        query.push(" AND c.pet_id = ").push_bind(pet);
    }
    if let Some(usuario) = participant_user_id {
        query
            .push(" AND (c.tutor_id = ")
            .push_bind(usuario)
            .push(" OR c.veterinario_id = ")
            .push_bind(usuario)
            .push(")");
    }
    query.push(" ORDER BY datetime(c.data_consulta) DESC");
    let consultas = query
        .build_query_as::<ConsultaDetalhada>()
        .fetch_all(pool)
        .await?;
    Ok(consultas)
}

/// Agenda uma consulta e devolve a linha armazenada
pub async fn create_consulta(pool: &SqlitePool, nova: &NovaConsulta) -> Result<Consulta, DbError> {
    nova.validate()?;
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO consultas (id, pet_id, veterinario_id, tutor_id, data_consulta, motivo, \
            sintomas, diagnostico, tratamento, observacoes, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(nova.pet_id)
    .bind(nova.veterinario_id)
    .bind(nova.tutor_id)
    .bind(nova.data_consulta)
    .bind(&nova.motivo)
    .bind(&nova.sintomas)
    .bind(&nova.diagnostico)
    .bind(&nova.tratamento)
    .bind(&nova.observacoes)
    .bind(nova.status.as_str())
    .execute(pool)
    .await?;

    let consulta = sqlx::query_as::<_, Consulta>("SELECT * FROM consultas WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(consulta)
}

/// Lista vacinas com pet e veterinário (quando registrado) resolvidos.
///
/// Não há parâmetro de escopo por usuário nesta operação; visões restritas a
/// um tutor dependem de filtragem posterior pelo chamador. Ordenado da
/// aplicação mais recente para a mais antiga.
pub async fn list_vacinas(
    pool: &SqlitePool,
    pet_id: Option<Uuid>,
) -> Result<Vec<VacinaDetalhada>, DbError> {
    let select = format!(
        "SELECT va.*, {}, {} FROM vacinas va \
         JOIN pets p ON p.id = va.pet_id \
         LEFT JOIN profiles vet ON vet.id = va.veterinario_id \
         WHERE 1 = 1",
        colunas_prefixadas("p", "pet__", PET_COLS),
        colunas_prefixadas("vet", "veterinario__", PROFILE_COLS),
    );
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    if let Some(pet) = pet_id {
        query.push(" AND va.pet_id = ").push_bind(pet);
    }
    query.push(" ORDER BY va.data_aplicacao DESC");
    let vacinas = query
        .build_query_as::<VacinaDetalhada>()
        .fetch_all(pool)
        .await?;
    Ok(vacinas)
}

/// Registra uma vacina aplicada e devolve a linha armazenada
pub async fn create_vacina(pool: &SqlitePool, nova: &NovaVacina) -> Result<Vacina, DbError> {
    nova.validate()?;
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO vacinas (id, pet_id, nome_vacina, data_aplicacao, proxima_dose, \
            veterinario_id, lote, fabricante, observacoes) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(nova.pet_id)
    .bind(&nova.nome_vacina)
    .bind(nova.data_aplicacao)
    .bind(nova.proxima_dose)
    .bind(nova.veterinario_id)
    .bind(&nova.lote)
    .bind(&nova.fabricante)
    .bind(&nova.observacoes)
    .execute(pool)
    .await?;

    let vacina = sqlx::query_as::<_, Vacina>("SELECT * FROM vacinas WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(vacina)
}

/// Lista prescrições com consulta, pet e veterinário resolvidos. Ordenado da
/// emissão mais recente para a mais antiga.
pub async fn list_prescricoes(
    pool: &SqlitePool,
    pet_id: Option<Uuid>,
    veterinario_id: Option<Uuid>,
) -> Result<Vec<PrescricaoDetalhada>, DbError> {
    let select = format!(
        "SELECT pr.*, {}, {}, {} FROM prescricoes pr \
         JOIN consultas c ON c.id = pr.consulta_id \
         JOIN pets p ON p.id = pr.pet_id \
         JOIN profiles v ON v.id = pr.veterinario_id \
         WHERE 1 = 1",
        colunas_prefixadas("c", "consulta__", CONSULTA_COLS),
        colunas_prefixadas("p", "pet__", PET_COLS),
        colunas_prefixadas("v", "veterinario__", PROFILE_COLS),
    );
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    if let Some(pet) = pet_id {
        query.push(" AND pr.pet_id = ").push_bind(pet);
    }
    if let Some(veterinario) = veterinario_id {
        query.push(" AND pr.veterinario_id = ").push_bind(veterinario);
    }
    query.push(" ORDER BY datetime(pr.created_at) DESC, pr.id");
    let prescricoes = query
        .build_query_as::<PrescricaoDetalhada>()
        .fetch_all(pool)
        .await?;
    Ok(prescricoes)
}

/// Emite uma prescrição e devolve a linha armazenada
pub async fn create_prescricao(
    pool: &SqlitePool,
    nova: &NovaPrescricao,
) -> Result<Prescricao, DbError> {
    nova.validate()?;
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO prescricoes (id, consulta_id, pet_id, veterinario_id, medicamento, dosagem, \
            frequencia, duracao, instrucoes, data_inicio, data_fim, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(nova.consulta_id)
    .bind(nova.pet_id)
    .bind(nova.veterinario_id)
    .bind(&nova.medicamento)
    .bind(&nova.dosagem)
    .bind(&nova.frequencia)
    .bind(&nova.duracao)
    .bind(&nova.instrucoes)
    .bind(nova.data_inicio)
    .bind(nova.data_fim)
    .bind(nova.status.as_str())
    .execute(pool)
    .await?;

    let prescricao = sqlx::query_as::<_, Prescricao>("SELECT * FROM prescricoes WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(prescricao)
}

/// Lista exames com consulta (quando houver), pet e veterinário resolvidos.
/// Ordenado do exame mais recente para o mais antigo.
pub async fn list_exames(
    pool: &SqlitePool,
    pet_id: Option<Uuid>,
    veterinario_id: Option<Uuid>,
) -> Result<Vec<ExameDetalhado>, DbError> {
    let select = format!(
        "SELECT e.*, {}, {}, {} FROM exames e \
         LEFT JOIN consultas c ON c.id = e.consulta_id \
         JOIN pets p ON p.id = e.pet_id \
         JOIN profiles v ON v.id = e.veterinario_id \
         WHERE 1 = 1",
        colunas_prefixadas("c", "consulta__", CONSULTA_COLS),
        colunas_prefixadas("p", "pet__", PET_COLS),
        colunas_prefixadas("v", "veterinario__", PROFILE_COLS),
    );
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(select);
    if let Some(pet) = pet_id {
        query.push(" AND e.pet_id = ").push_bind(pet);
    }
    if let Some(veterinario) = veterinario_id {
        query.push(" AND e.veterinario_id = ").push_bind(veterinario);
    }
    query.push(" ORDER BY e.data_exame DESC");
    let exames = query
        .build_query_as::<ExameDetalhado>()
        .fetch_all(pool)
        .await?;
    Ok(exames)
}

/// Solicita um exame e devolve a linha armazenada
pub async fn create_exame(pool: &SqlitePool, novo: &NovoExame) -> Result<Exame, DbError> {
    novo.validate()?;
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO exames (id, consulta_id, pet_id, veterinario_id, tipo_exame, data_exame, \
            resultado, arquivo_url, observacoes, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(novo.consulta_id)
    .bind(novo.pet_id)
    .bind(novo.veterinario_id)
    .bind(&novo.tipo_exame)
    .bind(novo.data_exame)
    .bind(&novo.resultado)
    .bind(&novo.arquivo_url)
    .bind(&novo.observacoes)
    .bind(novo.status.as_str())
    .execute(pool)
    .await?;

    let exame = sqlx::query_as::<_, Exame>("SELECT * FROM exames WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exame)
}

/// Lista todos os perfis com papel veterinário, em ordem alfabética
pub async fn list_veterinarios(pool: &SqlitePool) -> Result<Vec<UserProfile>, DbError> {
    let veterinarios = sqlx::query_as::<_, UserProfile>(
        "SELECT * FROM profiles WHERE role = 'veterinario' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(veterinarios)
}

/// Lista todos os perfis cadastrados, em ordem alfabética
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserProfile>, DbError> {
    let usuarios = sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(usuarios)
}
