//! Contrato do serviço de identidade
//!
//! O provedor real (serviço de identidade hospedado) fica fora deste
//! repositório; aqui vive apenas o contrato que o restante do ecossistema
//! consome. O tratamento de tokens é responsabilidade do provedor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use petcuidado_db::UserRole;

use crate::error::AuthError;

/// Usuário presente na sessão ativa do provedor de identidade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identificador do sujeito, o mesmo id da tabela de perfis
    pub id: Uuid,
    pub email: String,
}

/// Metadados informados no cadastro, usados pelo provedor para provisionar o
/// perfil
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub name: String,
    pub role: UserRole,
}

/// Serviço de identidade externo
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Usuário da sessão ativa, se houver
    async fn get_session_user(&self) -> Result<Option<SessionUser>, AuthError>;

    /// Autentica com e-mail e senha, abrindo uma sessão
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, AuthError>;

    /// Encerra a sessão ativa
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Cadastra um novo usuário com os metadados de perfil
    async fn sign_up_with_metadata(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SessionUser, AuthError>;
}
