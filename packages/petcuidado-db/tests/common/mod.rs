//! Utilidades compartilhadas pelos testes de integração

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use petcuidado_db::{init_db_pool, DbConfig, Especie, NovaConsulta, NovoPet, StatusConsulta};

/// Banco SQLite migrado em diretório temporário
pub async fn pool_de_teste() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("diretório temporário");
    let config = DbConfig {
        db_path: dir.path().join("petcuidado_test.db").display().to_string(),
        max_connections: 2,
    };
    let pool = init_db_pool(&config).await.expect("pool de teste");
    (dir, pool)
}

/// Insere um perfil direto no banco (provisionamento é papel do serviço de
/// identidade, fora desta biblioteca)
pub async fn insere_perfil(pool: &SqlitePool, role: &str, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, email, role, name) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(format!("{id}@petcuidado.com.br"))
        .bind(role)
        .bind(name)
        .execute(pool)
        .await
        .expect("insere perfil");
    id
}

pub fn novo_pet(user_id: Uuid, name: &str) -> NovoPet {
    NovoPet {
        user_id,
        name: name.to_string(),
        species: Especie::Cao,
        breed: None,
        birth_date: None,
        weight: None,
        color: None,
        microchip: None,
        notes: None,
    }
}

pub fn nova_consulta(
    pet_id: Uuid,
    veterinario_id: Uuid,
    tutor_id: Uuid,
    data_consulta: DateTime<Utc>,
) -> NovaConsulta {
    NovaConsulta {
        pet_id,
        veterinario_id,
        tutor_id,
        data_consulta,
        motivo: "Avaliação de rotina".to_string(),
        sintomas: None,
        diagnostico: None,
        tratamento: None,
        observacoes: None,
        status: StatusConsulta::default(),
    }
}
