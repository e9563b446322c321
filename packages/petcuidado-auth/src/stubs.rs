//! Implementações em memória do serviço de identidade
//!
//! Usadas em testes e wiring local. Não são duráveis nem seguras; o
//! provisionamento do perfil correspondente continua a cargo do provedor
//! real (ou do próprio teste).

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;
use crate::session::{IdentityService, SessionUser, SignUpMetadata};

/// Provedor de identidade estático em memória
#[derive(Debug, Default)]
pub struct StaticIdentity {
    sessao: Mutex<Option<SessionUser>>,
    indisponivel: bool,
}

impl StaticIdentity {
    /// Provedor com uma sessão já aberta
    pub fn logged_in(usuario: SessionUser) -> Self {
        Self {
            sessao: Mutex::new(Some(usuario)),
            indisponivel: false,
        }
    }

    /// Provedor sem sessão ativa
    pub fn logged_out() -> Self {
        Self::default()
    }

    /// Provedor que falha em toda chamada, para simular indisponibilidade
    pub fn unavailable() -> Self {
        Self {
            sessao: Mutex::new(None),
            indisponivel: true,
        }
    }

    fn verifica_disponibilidade(&self) -> Result<(), AuthError> {
        if self.indisponivel {
            Err(AuthError::Provider(
                "serviço de identidade indisponível".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn abre_sessao(&self, email: &str) -> SessionUser {
        let usuario = SessionUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        *self.sessao.lock().unwrap_or_else(|e| e.into_inner()) = Some(usuario.clone());
        usuario
    }
}

#[async_trait]
impl IdentityService for StaticIdentity {
    async fn get_session_user(&self) -> Result<Option<SessionUser>, AuthError> {
        self.verifica_disponibilidade()?;
        Ok(self.sessao.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, AuthError> {
        self.verifica_disponibilidade()?;
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.abre_sessao(email))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.verifica_disponibilidade()?;
        *self.sessao.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    async fn sign_up_with_metadata(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SessionUser, AuthError> {
        self.verifica_disponibilidade()?;
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        if metadata.name.is_empty() {
            return Err(AuthError::SignUpRejected("Nome é obrigatório".to_string()));
        }
        Ok(self.abre_sessao(email))
    }
}
