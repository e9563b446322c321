//! PetCuidado DB - Biblioteca compartilhada de acesso a dados da clínica
//!
//! Esta biblioteca fornece:
//! - Modelos de dados compartilhados (perfis, pets e registros clínicos)
//! - Migrações automáticas do banco de dados
//! - Camada de consultas com escopo por papel e acesso por capacidade
//! - Agregador de contadores do painel
//! - Pool de conexão e funções de utilidades para SQLite

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub mod dashboard;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod scope;
pub mod validations;

pub use dashboard::{AdminOverview, DashboardStats, StatCounter};
pub use error::DbError;
pub use models::{
    Consulta, ConsultaDetalhada, Especie, Exame, ExameDetalhado, Pet, Prescricao,
    PrescricaoDetalhada, StatusConsulta, StatusExame, StatusPrescricao, UserProfile, UserRole,
    Vacina, VacinaDetalhada,
};
pub use scope::ScopedAccess;
pub use validations::{AtualizaPet, NovaConsulta, NovaPrescricao, NovaVacina, NovoExame, NovoPet};

/// Configuração da conexão com o banco de dados
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Caminho para o arquivo SQLite
    pub db_path: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: "data/petcuidado.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Inicializa uma conexão com o banco de dados SQLite
pub async fn init_db_pool(config: &DbConfig) -> Result<SqlitePool> {
    let db_path = Path::new(&config.db_path);

    // Verifica se o diretório pai existe
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .context("Falha ao criar diretório para banco de dados")?;
        }
    }

    // Configura as opções de conexão SQLite
    let connection_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .pragma("synchronous", "NORMAL");

    // Cria o pool de conexões
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connection_options)
        .await
        .context("Falha ao conectar ao banco de dados SQLite")?;

    // Aplica migrações automáticas
    migrations::run_migrations(&pool)
        .await
        .context("Falha ao aplicar migrações")?;

    info!("Banco de dados inicializado com sucesso: {}", config.db_path);
    Ok(pool)
}
