//! Acesso com escopo derivado do perfil
//!
//! As funções de `queries` aceitam os parâmetros de escopo que o chamador
//! fornecer; este módulo fecha essa fronteira de confiança. Um valor de
//! [`ScopedAccess`] é construído a partir de um perfil já resolvido e deriva
//! os argumentos de escopo internamente: consultas sem escopo, reservadas a
//! administradores, são inalcançáveis a partir de uma capacidade de tutor ou
//! veterinário.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::dashboard::{admin_overview, dashboard_stats, AdminOverview, DashboardStats};
use crate::error::DbError;
use crate::models::{
    Consulta, ConsultaDetalhada, Exame, ExameDetalhado, Pet, Prescricao, PrescricaoDetalhada,
    UserProfile, UserRole, Vacina, VacinaDetalhada,
};
use crate::queries;
use crate::validations::{
    AtualizaPet, NovaConsulta, NovaPrescricao, NovaVacina, NovoExame, NovoPet,
};

/// Capacidade de acesso aos dados em nome de um usuário
#[derive(Debug, Clone)]
pub struct ScopedAccess {
    pool: SqlitePool,
    profile: UserProfile,
}

impl ScopedAccess {
    pub fn new(pool: SqlitePool, profile: UserProfile) -> Self {
        Self { pool, profile }
    }

    /// Perfil dono desta capacidade
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    fn admin(&self) -> bool {
        self.profile.role == UserRole::Admin
    }

    /// Escopo de usuário injetado nas listagens: nenhum para admin, o próprio
    /// id para os demais papéis
    fn escopo_usuario(&self) -> Option<Uuid> {
        if self.admin() {
            None
        } else {
            Some(self.profile.id)
        }
    }

    fn exige_admin(&self, operacao: &str) -> Result<(), DbError> {
        if self.admin() {
            Ok(())
        } else {
            Err(DbError::Forbidden(format!(
                "Operação {} exige papel admin",
                operacao
            )))
        }
    }

    /// Pets visíveis: todos para admin, os próprios para os demais
    pub async fn pets(&self) -> Result<Vec<Pet>, DbError> {
        queries::list_pets(&self.pool, self.escopo_usuario()).await
    }

    /// Busca um pet visível. Pets de outros tutores aparecem como não
    /// encontrados para quem não é admin.
    pub async fn pet(&self, id: Uuid) -> Result<Pet, DbError> {
        let pet = queries::get_pet_by_id(&self.pool, id).await?;
        if !self.admin() && pet.user_id != self.profile.id {
            return Err(DbError::NotFound(format!("Pet {} não encontrado", id)));
        }
        Ok(pet)
    }

    /// Cadastra um pet. Para quem não é admin, o dono é sempre o próprio
    /// usuário, independente do payload.
    pub async fn create_pet(&self, mut novo: NovoPet) -> Result<Pet, DbError> {
        if !self.admin() {
            novo.user_id = self.profile.id;
        }
        queries::create_pet(&self.pool, &novo).await
    }

    /// Atualiza um pet visível
    pub async fn update_pet(&self, id: Uuid, atualiza: &AtualizaPet) -> Result<Pet, DbError> {
        self.pet(id).await?;
        queries::update_pet(&self.pool, id, atualiza).await
    }

    /// Remove um pet. Apenas o dono ou um admin podem excluir.
    pub async fn delete_pet(&self, id: Uuid) -> Result<(), DbError> {
        self.pet(id).await?;
        queries::delete_pet(&self.pool, id).await
    }

    /// Consultas das quais o usuário participa (como tutor ou veterinário);
    /// todas para admin
    pub async fn consultas(&self, pet_id: Option<Uuid>) -> Result<Vec<ConsultaDetalhada>, DbError> {
        queries::list_consultas(&self.pool, pet_id, self.escopo_usuario()).await
    }

    /// Agenda uma consulta. Tutores agendam em nome próprio; veterinários
    /// figuram como o profissional da consulta.
    pub async fn create_consulta(&self, mut nova: NovaConsulta) -> Result<Consulta, DbError> {
        match self.profile.role {
            UserRole::Tutor => nova.tutor_id = self.profile.id,
            UserRole::Veterinario => nova.veterinario_id = self.profile.id,
            UserRole::Admin => {}
        }
        queries::create_consulta(&self.pool, &nova).await
    }

    /// Vacinas, opcionalmente de um pet. A listagem subjacente não tem escopo
    /// por usuário; o resultado é o mesmo para qualquer papel.
    pub async fn vacinas(&self, pet_id: Option<Uuid>) -> Result<Vec<VacinaDetalhada>, DbError> {
        queries::list_vacinas(&self.pool, pet_id).await
    }

    /// Registra uma vacina. Veterinários assinam o registro.
    pub async fn create_vacina(&self, mut nova: NovaVacina) -> Result<Vacina, DbError> {
        if self.profile.role == UserRole::Veterinario {
            nova.veterinario_id = Some(self.profile.id);
        }
        queries::create_vacina(&self.pool, &nova).await
    }

    /// Prescrições emitidas pelo usuário; todas para admin
    pub async fn prescricoes(
        &self,
        pet_id: Option<Uuid>,
    ) -> Result<Vec<PrescricaoDetalhada>, DbError> {
        queries::list_prescricoes(&self.pool, pet_id, self.escopo_usuario()).await
    }

    /// Emite uma prescrição. Veterinários assinam a emissão.
    pub async fn create_prescricao(&self, mut nova: NovaPrescricao) -> Result<Prescricao, DbError> {
        if self.profile.role == UserRole::Veterinario {
            nova.veterinario_id = self.profile.id;
        }
        queries::create_prescricao(&self.pool, &nova).await
    }

    /// Exames solicitados pelo usuário; todos para admin
    pub async fn exames(&self, pet_id: Option<Uuid>) -> Result<Vec<ExameDetalhado>, DbError> {
        queries::list_exames(&self.pool, pet_id, self.escopo_usuario()).await
    }

    /// Solicita um exame. Veterinários assinam a solicitação.
    pub async fn create_exame(&self, mut novo: NovoExame) -> Result<Exame, DbError> {
        if self.profile.role == UserRole::Veterinario {
            novo.veterinario_id = self.profile.id;
        }
        queries::create_exame(&self.pool, &novo).await
    }

    /// Veterinários cadastrados, disponível para qualquer papel (usado nos
    /// formulários de agendamento)
    pub async fn veterinarios(&self) -> Result<Vec<UserProfile>, DbError> {
        queries::list_veterinarios(&self.pool).await
    }

    /// Contadores do painel do próprio usuário
    pub async fn stats(&self) -> DashboardStats {
        dashboard_stats(&self.pool, self.profile.id, self.profile.role).await
    }

    /// Todos os perfis cadastrados. Exclusivo de admin.
    pub async fn users(&self) -> Result<Vec<UserProfile>, DbError> {
        self.exige_admin("users")?;
        queries::list_users(&self.pool).await
    }

    /// Contadores globais da visão administrativa. Exclusivo de admin.
    pub async fn overview(&self) -> Result<AdminOverview, DbError> {
        self.exige_admin("overview")?;
        Ok(admin_overview(&self.pool).await)
    }
}
