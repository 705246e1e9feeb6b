// src/services/user_service.rs
//
// Regras de cadastro e atualização de usuários: nomes, time, política de
// senha, derivação de username e a guarda referencial de exclusão.

use bcrypt::hash;
use uuid::Uuid;

use crate::{
    common::error::{AppError, FieldErrors},
    common::validators::{
        check_letters_hyphen, generate_username, is_valid_password, is_valid_team, title_case,
        two_entries_differ,
    },
    db::{ClientRepository, EventRepository, UserRepository},
    models::auth::{RegisterUserPayload, Team, UpdateUserPayload, User},
};

/// Resultado do passo objeto: nomes normalizados, time resolvido e a senha
/// em claro a ser hasheada (None = inalterada).
#[derive(Debug, PartialEq)]
pub struct ValidatedUserInput {
    pub first_name: String,
    pub last_name: String,
    pub team: Team,
    pub password: Option<String>,
}

/// Passo objeto puro: acumula todas as violações antes de rejeitar.
/// `passwords_required` distingue cadastro (obrigatórias) de atualização
/// (vazias = senha inalterada).
pub fn validate_user_rules(
    first_name: &str,
    last_name: &str,
    password1: &str,
    password2: &str,
    team_label: &str,
    passwords_required: bool,
) -> Result<ValidatedUserInput, AppError> {
    let mut errors = FieldErrors::new();

    if let Err(message) = check_letters_hyphen(first_name, "first_name") {
        errors.entry("first_name".into()).or_default().push(message);
    }
    if let Err(message) = check_letters_hyphen(last_name, "last_name") {
        errors.entry("last_name".into()).or_default().push(message);
    }
    if let Err(message) = is_valid_team(team_label) {
        errors.entry("team".into()).or_default().push(message);
    }

    let mut password = None;
    let both_empty = password1.is_empty() && password2.is_empty();
    let both_filled = !password1.is_empty() && !password2.is_empty();
    if both_empty && !passwords_required {
        // atualização sem troca de senha
    } else if !both_filled {
        errors.entry("non_field_errors".into()).or_default().push(
            "Password error : You must supply both password1 and password2 !".to_string(),
        );
    } else {
        if let Err(message) = two_entries_differ(password1, password2) {
            errors
                .entry("non_field_errors".into())
                .or_default()
                .push(message);
        }
        if let Err(messages) = is_valid_password(password1) {
            errors
                .entry("password1".into())
                .or_default()
                .extend(messages);
        }
        password = Some(password1.to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Rules(errors));
    }

    Ok(ValidatedUserInput {
        first_name: title_case(first_name),
        last_name: title_case(last_name),
        // O rótulo já passou por is_valid_team
        team: Team::from_label(team_label).expect("team label validated"),
        password,
    })
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    client_repo: ClientRepository,
    event_repo: EventRepository,
    pool: sqlx::PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        client_repo: ClientRepository,
        event_repo: EventRepository,
        pool: sqlx::PgPool,
    ) -> Self {
        Self { user_repo, client_repo, event_repo, pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub async fn list(
        &self,
        filters: &std::collections::HashMap<String, String>,
    ) -> Result<Vec<User>, AppError> {
        self.user_repo.list(filters).await
    }

    pub async fn register(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        let input = validate_user_rules(
            &payload.first_name,
            &payload.last_name,
            &payload.password1,
            &payload.password2,
            &payload.team,
            true,
        )?;

        let taken = self.user_repo.taken_usernames(None).await?;
        let username = generate_username(&input.first_name, &input.last_name, &taken);
        let password_hash = hash_password(input.password.expect("required on register")).await?;

        self.user_repo
            .create_user(
                &self.pool,
                &input.first_name,
                &input.last_name,
                &username,
                &password_hash,
                input.team,
                payload.is_superuser,
            )
            .await
    }

    /// `existing` vem do controlador, que já resolveu o alvo e a
    /// permissão; a validação compara o proposto com o armazenado.
    pub async fn update(
        &self,
        existing: &User,
        payload: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        let input = validate_user_rules(
            &payload.first_name,
            &payload.last_name,
            &payload.password1,
            &payload.password2,
            &payload.team,
            false,
        )?;

        // Username só muda quando o nome muda, com desvio de colisão
        // excluindo o próprio registro
        let names_changed = input.first_name != existing.first_name
            || input.last_name != existing.last_name;
        let username = if names_changed {
            let taken = self.user_repo.taken_usernames(Some(existing.id)).await?;
            generate_username(&input.first_name, &input.last_name, &taken)
        } else {
            existing.username.clone()
        };

        let password_hash = match input.password {
            Some(plain) => Some(hash_password(plain).await?),
            None => None,
        };

        self.user_repo
            .update_user(
                existing.id,
                &input.first_name,
                &input.last_name,
                &username,
                password_hash.as_deref(),
                input.team,
                payload.is_superuser.unwrap_or(existing.is_superuser),
            )
            .await
    }

    /// Guarda referencial: a exclusão é bloqueada enquanto o usuário for
    /// contato de clientes ou de eventos, listando os bloqueadores.
    pub async fn delete(&self, existing: &User) -> Result<(), AppError> {
        let clients = self
            .client_repo
            .names_by_sales_contact(existing.id)
            .await?;
        if !clients.is_empty() {
            return Err(AppError::DeleteBlocked(sales_guard_message(&clients)));
        }

        let events = self
            .event_repo
            .names_by_support_contact(existing.id)
            .await?;
        if !events.is_empty() {
            return Err(AppError::DeleteBlocked(support_guard_message(&events)));
        }

        self.user_repo.delete_user(existing.id).await?;
        Ok(())
    }

    /// Rotina explícita de bring-up: numa base vazia cria o superusuário
    /// de gestão, senão o endpoint de cadastro (restrito à gestão) fica
    /// inalcançável.
    pub async fn ensure_initial_superuser(&self, password: Option<String>) -> Result<(), AppError> {
        if self.user_repo.any_user_exists().await? {
            return Ok(());
        }
        let Some(password) = password else {
            tracing::warn!(
                "Base vazia e INITIAL_ADMIN_PASSWORD ausente; nenhum superusuário criado."
            );
            return Ok(());
        };
        let password_hash = hash_password(password).await?;
        self.user_repo
            .create_user(
                &self.pool,
                "Admin",
                "Admin",
                "admin",
                &password_hash,
                Team::Management,
                true,
            )
            .await?;
        tracing::info!("Superusuário inicial 'admin' criado.");
        Ok(())
    }
}

pub fn sales_guard_message(clients: &[String]) -> String {
    format!(
        "This user is sales contact for the following clients : [{}]. \
         You must change these clients sales contact prior to delete this user.",
        clients.join(", ")
    )
}

pub fn support_guard_message(events: &[String]) -> String {
    format!(
        "This user is support for the following events : [{}]. \
         You must change these events support contact prior to delete this user.",
        events.join(", ")
    )
}

async fn hash_password(plain: String) -> Result<String, AppError> {
    // Hashing fora do executor async, como no login
    tokio::task::spawn_blocking(move || hash(&plain, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(err: &AppError, key: &str) -> Vec<String> {
        match err {
            AppError::Rules(map) => map.get(key).cloned().unwrap_or_default(),
            other => panic!("expected Rules, got {other:?}"),
        }
    }

    #[test]
    fn register_rules_accumulate_every_violation() {
        let err = validate_user_rules("james8", "bond007", "toto", "1234", "support", true)
            .unwrap_err();
        assert_eq!(
            field(&err, "first_name")[0],
            "<first_name>: Only letters and hyphen are authorized"
        );
        assert_eq!(
            field(&err, "last_name")[0],
            "<last_name>: Only letters and hyphen are authorized"
        );
        assert_eq!(
            field(&err, "team")[0],
            "<Team>: Team must be one of these : Management, Sales or Support"
        );
        assert_eq!(
            field(&err, "password1")[0],
            "Password error : your password must contain letters and numbers"
        );
        assert_eq!(
            field(&err, "non_field_errors")[0],
            "Password error : Your two entries for password differ !"
        );
    }

    #[test]
    fn register_requires_both_passwords() {
        let err = validate_user_rules("james", "bond", "", "", "Support", true).unwrap_err();
        assert_eq!(
            field(&err, "non_field_errors")[0],
            "Password error : You must supply both password1 and password2 !"
        );
    }

    #[test]
    fn update_accepts_empty_passwords_as_no_change() {
        let input =
            validate_user_rules("hella", "compagne", "", "", "Support", false).unwrap();
        assert_eq!(input.password, None);
        assert_eq!(input.first_name, "Hella");
        assert_eq!(input.last_name, "Compagne");
        assert_eq!(input.team, Team::Support);
    }

    #[test]
    fn update_rejects_a_single_password_entry() {
        let err = validate_user_rules("hella", "compagne", "", "newpassword99", "Management", false)
            .unwrap_err();
        assert_eq!(
            field(&err, "non_field_errors")[0],
            "Password error : You must supply both password1 and password2 !"
        );
    }

    #[test]
    fn update_rejects_differing_passwords() {
        let err = validate_user_rules(
            "hella",
            "compagne",
            "newpassword9",
            "newpassword99",
            "Management",
            false,
        )
        .unwrap_err();
        assert_eq!(
            field(&err, "non_field_errors")[0],
            "Password error : Your two entries for password differ !"
        );
    }

    #[test]
    fn valid_register_normalizes_names_and_team() {
        let input =
            validate_user_rules("james", "bond", "toto1234", "toto1234", "Management", true)
                .unwrap();
        assert_eq!(input.first_name, "James");
        assert_eq!(input.last_name, "Bond");
        assert_eq!(input.team, Team::Management);
        assert_eq!(input.password.as_deref(), Some("toto1234"));
    }

    #[test]
    fn guard_messages_enumerate_blockers() {
        let clients = vec!["Dark Vador".to_string(), "Luke Skywalker".to_string()];
        assert_eq!(
            sales_guard_message(&clients),
            "This user is sales contact for the following clients : \
             [Dark Vador, Luke Skywalker]. You must change these clients sales contact \
             prior to delete this user."
        );
        let events = vec!["Death Star".to_string()];
        assert_eq!(
            support_guard_message(&events),
            "This user is support for the following events : [Death Star]. \
             You must change these events support contact prior to delete this user."
        );
    }
}
