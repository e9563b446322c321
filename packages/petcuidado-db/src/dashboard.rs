//! Agregador de contadores do painel
//!
//! Quatro contadores por usuário/papel, calculados com consultas de contagem
//! independentes emitidas em paralelo. O contrato é de melhor esforço: uma
//! contagem que falha é registrada no log e degrada para zero com
//! `computed = false`, para que o chamador consiga distinguir "zero de fato"
//! de "não calculado". A função nunca devolve erro.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::error;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::UserRole;

/// Valor de um contador junto com a indicação de que foi calculado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCounter {
    pub value: i64,
    pub computed: bool,
}

impl StatCounter {
    fn ok(value: i64) -> Self {
        Self { value, computed: true }
    }
}

/// Contadores do painel de um usuário
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Pets visíveis: todos para admin, os próprios para os demais papéis
    pub total_pets: StatCounter,
    /// Consultas do dia corrente (dia-calendário local do servidor)
    pub consultas_hoje: StatCounter,
    /// Vacinas com próxima dose vencida ou vencendo hoje. Contagem global,
    /// sem escopo por usuário.
    pub vacinas_pendentes: StatCounter,
    /// Prescrições com status ativa. Contagem global, sem escopo por usuário.
    pub prescricoes_ativas: StatCounter,
}

/// Contadores globais da visão administrativa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_usuarios: StatCounter,
    pub total_pets: StatCounter,
    pub total_consultas: StatCounter,
    pub total_veterinarios: StatCounter,
}

/// Calcula os contadores do painel para o dia corrente
pub async fn dashboard_stats(pool: &SqlitePool, user_id: Uuid, role: UserRole) -> DashboardStats {
    dashboard_stats_no_dia(pool, user_id, role, Local::now().date_naive()).await
}

/// Variante com o dia explícito, útil para testes e reprocessamentos
pub async fn dashboard_stats_no_dia(
    pool: &SqlitePool,
    user_id: Uuid,
    role: UserRole,
    dia: NaiveDate,
) -> DashboardStats {
    let (pets, consultas, vacinas, prescricoes) = tokio::join!(
        conta_pets(pool, user_id, role),
        conta_consultas_no_dia(pool, user_id, role, dia),
        conta_vacinas_pendentes(pool, dia),
        conta_prescricoes_ativas(pool),
    );

    DashboardStats {
        total_pets: degrada("total_pets", pets),
        consultas_hoje: degrada("consultas_hoje", consultas),
        vacinas_pendentes: degrada("vacinas_pendentes", vacinas),
        prescricoes_ativas: degrada("prescricoes_ativas", prescricoes),
    }
}

/// Calcula os contadores globais da visão administrativa, com o mesmo
/// contrato de melhor esforço do painel
pub async fn admin_overview(pool: &SqlitePool) -> AdminOverview {
    let (usuarios, pets, consultas, veterinarios) = tokio::join!(
        conta_linhas(pool, "SELECT COUNT(*) FROM profiles"),
        conta_linhas(pool, "SELECT COUNT(*) FROM pets"),
        conta_linhas(pool, "SELECT COUNT(*) FROM consultas"),
        conta_linhas(pool, "SELECT COUNT(*) FROM profiles WHERE role = 'veterinario'"),
    );

    AdminOverview {
        total_usuarios: degrada("total_usuarios", usuarios),
        total_pets: degrada("total_pets", pets),
        total_consultas: degrada("total_consultas", consultas),
        total_veterinarios: degrada("total_veterinarios", veterinarios),
    }
}

/// Janela [início, fim) do dia-calendário local, em UTC, usada pelo contador
/// de consultas do dia
pub fn janela_local_do_dia(dia: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let amanha = dia.succ_opt().unwrap_or(NaiveDate::MAX);
    (inicio_local_em_utc(dia), inicio_local_em_utc(amanha))
}

fn inicio_local_em_utc(dia: NaiveDate) -> DateTime<Utc> {
    let meia_noite = dia.and_time(NaiveTime::MIN);
    match meia_noite.and_local_timezone(Local) {
        LocalResult::Single(instante) => instante.with_timezone(&Utc),
        // Transições de horário de verão: fica com a primeira ocorrência
        LocalResult::Ambiguous(instante, _) => instante.with_timezone(&Utc),
        // Meia-noite inexistente no fuso local
        LocalResult::None => Utc.from_utc_datetime(&meia_noite),
    }
}

fn degrada(contador: &'static str, resultado: Result<i64, DbError>) -> StatCounter {
    match resultado {
        Ok(valor) => StatCounter::ok(valor),
        Err(erro) => {
            error!(contador, %erro, "falha ao calcular contador do painel");
            StatCounter { value: 0, computed: false }
        }
    }
}

async fn conta_pets(pool: &SqlitePool, user_id: Uuid, role: UserRole) -> Result<i64, DbError> {
    let total = match role {
        UserRole::Admin => {
            sqlx::query_scalar("SELECT COUNT(*) FROM pets")
                .fetch_one(pool)
                .await?
        }
        _ => {
            sqlx::query_scalar("SELECT COUNT(*) FROM pets WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(pool)
                .await?
        }
    };
    Ok(total)
}

async fn conta_consultas_no_dia(
    pool: &SqlitePool,
    user_id: Uuid,
    role: UserRole,
    dia: NaiveDate,
) -> Result<i64, DbError> {
    let (inicio, fim) = janela_local_do_dia(dia);
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM consultas WHERE datetime(data_consulta) >= datetime(");
    query.push_bind(inicio);
    query.push(") AND datetime(data_consulta) < datetime(");
    query.push_bind(fim);
    query.push(")");
    if role != UserRole::Admin {
        query.push(" AND tutor_id = ").push_bind(user_id);
    }
    let total: i64 = query.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

async fn conta_vacinas_pendentes(pool: &SqlitePool, dia: NaiveDate) -> Result<i64, DbError> {
    let total = sqlx::query_scalar(
        "SELECT COUNT(*) FROM vacinas WHERE proxima_dose IS NOT NULL AND date(proxima_dose) <= date(?)",
    )
    .bind(dia)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

async fn conta_prescricoes_ativas(pool: &SqlitePool) -> Result<i64, DbError> {
    let total = sqlx::query_scalar("SELECT COUNT(*) FROM prescricoes WHERE status = 'ativa'")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

async fn conta_linhas(pool: &SqlitePool, query: &str) -> Result<i64, DbError> {
    let total = sqlx::query_scalar(query).fetch_one(pool).await?;
    Ok(total)
}
