//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Lista de migrações SQL a serem aplicadas
const MIGRATIONS: &[&str] = &[
    // 001_initial_schema.sql
    r#"
    -- Perfis de usuário (um por identidade autenticada)
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL CHECK (role IN ('admin', 'tutor', 'veterinario')),
        name TEXT NOT NULL,
        phone TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Pets cadastrados pelos tutores
    CREATE TABLE IF NOT EXISTS pets (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        species TEXT NOT NULL CHECK (species IN ('cao', 'gato')),
        breed TEXT,
        birth_date DATE,
        weight REAL CHECK (weight IS NULL OR weight > 0),
        color TEXT,
        microchip TEXT,
        notes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES profiles (id)
    );

    -- Consultas veterinárias
    CREATE TABLE IF NOT EXISTS consultas (
        id TEXT PRIMARY KEY NOT NULL,
        pet_id TEXT NOT NULL,
        veterinario_id TEXT NOT NULL,
        tutor_id TEXT NOT NULL,
        data_consulta TIMESTAMP NOT NULL,
        motivo TEXT NOT NULL,
        sintomas TEXT,
        diagnostico TEXT,
        tratamento TEXT,
        observacoes TEXT,
        status TEXT NOT NULL CHECK (status IN ('agendada', 'em_andamento', 'concluida', 'cancelada')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE RESTRICT,
        FOREIGN KEY (veterinario_id) REFERENCES profiles (id),
        FOREIGN KEY (tutor_id) REFERENCES profiles (id)
    );

    -- Registros de vacinação
    CREATE TABLE IF NOT EXISTS vacinas (
        id TEXT PRIMARY KEY NOT NULL,
        pet_id TEXT NOT NULL,
        nome_vacina TEXT NOT NULL,
        data_aplicacao DATE NOT NULL,
        proxima_dose DATE,
        veterinario_id TEXT,
        lote TEXT,
        fabricante TEXT,
        observacoes TEXT,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE RESTRICT,
        FOREIGN KEY (veterinario_id) REFERENCES profiles (id)
    );

    -- Prescrições de medicamentos
    CREATE TABLE IF NOT EXISTS prescricoes (
        id TEXT PRIMARY KEY NOT NULL,
        consulta_id TEXT NOT NULL,
        pet_id TEXT NOT NULL,
        veterinario_id TEXT NOT NULL,
        medicamento TEXT NOT NULL,
        dosagem TEXT NOT NULL,
        frequencia TEXT NOT NULL,
        duracao TEXT NOT NULL,
        instrucoes TEXT,
        data_inicio DATE NOT NULL,
        data_fim DATE,
        status TEXT NOT NULL CHECK (status IN ('ativa', 'concluida', 'suspensa')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (consulta_id) REFERENCES consultas (id),
        FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE RESTRICT,
        FOREIGN KEY (veterinario_id) REFERENCES profiles (id)
    );

    -- Exames laboratoriais e de imagem
    CREATE TABLE IF NOT EXISTS exames (
        id TEXT PRIMARY KEY NOT NULL,
        consulta_id TEXT,
        pet_id TEXT NOT NULL,
        veterinario_id TEXT NOT NULL,
        tipo_exame TEXT NOT NULL,
        data_exame DATE NOT NULL,
        resultado TEXT,
        arquivo_url TEXT,
        observacoes TEXT,
        status TEXT NOT NULL CHECK (status IN ('solicitado', 'em_andamento', 'concluido')),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (consulta_id) REFERENCES consultas (id),
        FOREIGN KEY (pet_id) REFERENCES pets (id) ON DELETE RESTRICT,
        FOREIGN KEY (veterinario_id) REFERENCES profiles (id)
    );

    -- Índices para otimização
    CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles (role);
    CREATE INDEX IF NOT EXISTS idx_pets_user_id ON pets (user_id);
    CREATE INDEX IF NOT EXISTS idx_consultas_pet_id ON consultas (pet_id);
    CREATE INDEX IF NOT EXISTS idx_consultas_tutor_id ON consultas (tutor_id);
    CREATE INDEX IF NOT EXISTS idx_consultas_veterinario_id ON consultas (veterinario_id);
    CREATE INDEX IF NOT EXISTS idx_consultas_data ON consultas (data_consulta);
    CREATE INDEX IF NOT EXISTS idx_vacinas_pet_id ON vacinas (pet_id);
    CREATE INDEX IF NOT EXISTS idx_vacinas_proxima_dose ON vacinas (proxima_dose);
    CREATE INDEX IF NOT EXISTS idx_prescricoes_pet_id ON prescricoes (pet_id);
    CREATE INDEX IF NOT EXISTS idx_prescricoes_status ON prescricoes (status);
    CREATE INDEX IF NOT EXISTS idx_exames_pet_id ON exames (pet_id);
    CREATE INDEX IF NOT EXISTS idx_exames_status ON exames (status);
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    // Obter a versão atual do banco de dados
    let mut version: i64 = 0;
    match sqlx::query_scalar("PRAGMA user_version").fetch_one(pool).await {
        Ok(v) => version = v,
        Err(e) => {
            error!("Erro ao obter versão do banco: {}", e);
            // Continuar mesmo assim, pois pode ser a primeira execução
        }
    }

    info!("Versão atual do banco: {}", version);

    // Aplicar cada migração pendente sequencialmente
    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        // Pular migrações já aplicadas
        if migration_version <= version {
            info!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        // Executar em uma transação para garantir atomicidade
        let mut transaction = pool.begin().await.context(format!(
            "Falha ao iniciar transação para migração {}",
            migration_version
        ))?;

        // Executar os comandos SQL
        sqlx::query(migration_sql)
            .execute(&mut *transaction)
            .await
            .context(format!("Falha ao executar migração {}", migration_version))?;

        // Atualizar versão do banco
        sqlx::query(&format!("PRAGMA user_version = {}", migration_version))
            .execute(&mut *transaction)
            .await
            .context(format!(
                "Falha ao atualizar versão para {}",
                migration_version
            ))?;

        // Commit da transação
        transaction.commit().await.context(format!(
            "Falha ao confirmar transação para migração {}",
            migration_version
        ))?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}
