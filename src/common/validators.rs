// src/common/validators.rs
//
// Checagens puras das regras de domínio. Cada função devolve as mensagens
// violadas (sem curto-circuito entre campos); o chamador acumula tudo no
// mapa campo -> mensagens antes de rejeitar a requisição.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// Nomes aceitam apenas letras e hífen.
pub fn check_letters_hyphen(data: &str, field: &str) -> Result<(), String> {
    for char in data.chars() {
        if !char.is_alphabetic() && char != '-' {
            return Err(format!("<{field}>: Only letters and hyphen are authorized"));
        }
    }
    Ok(())
}

pub fn check_is_phone_number(data: &str, field: &str) -> Result<(), String> {
    for char in data.chars() {
        if !char.is_numeric() {
            return Err(format!("<{field}>: A phone number can contain only numbers !"));
        }
    }
    Ok(())
}

/// Usada ao converter valores de filtro numéricos da query string.
pub fn check_is_float(data: &str, field: &str) -> Result<f64, String> {
    data.parse::<f64>()
        .map_err(|_| format!("<{field}>: This field must be a float number !"))
}

/// Política de senha: letras + números e tamanho mínimo de 8.
/// Devolve TODAS as regras violadas, não só a primeira.
pub fn is_valid_password(data: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let alpha = data.chars().any(|c| c.is_alphabetic());
    let numeric = data.chars().any(|c| c.is_numeric());
    if !alpha || !numeric {
        errors.push(
            "Password error : your password must contain letters and numbers".to_string(),
        );
    }
    if data.chars().count() < 8 {
        errors.push(
            "Password error : Your password must be at least 8 characters long!".to_string(),
        );
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Confirmação de senha: só compara quando as duas entradas vieram.
pub fn two_entries_differ(data1: &str, data2: &str) -> Result<(), String> {
    if !data1.is_empty() && !data2.is_empty() && data1 != data2 {
        return Err("Password error : Your two entries for password differ !".to_string());
    }
    Ok(())
}

pub fn is_valid_team(data: &str) -> Result<(), String> {
    if !matches!(data, "Management" | "Sales" | "Support") {
        return Err(
            "<Team>: Team must be one of these : Management, Sales or Support".to_string(),
        );
    }
    Ok(())
}

/// Comparação só de datas (hora do dia é ignorada).
pub fn is_prior_to_created_date(
    due: DateTime<Utc>,
    created: DateTime<Utc>,
) -> Result<(), String> {
    if due.date_naive() < created.date_naive() {
        return Err("Payment due date can't be prior to creation date".to_string());
    }
    Ok(())
}

/// Deriva o username: iniciais minúsculas das partes do primeiro nome
/// (separadas por hífen) + sobrenome minúsculo. Em caso de colisão, um
/// sufixo numérico incremental a partir de 2. Em fluxos de atualização o
/// chamador remove o próprio username do conjunto `taken`.
pub fn generate_username(first_name: &str, last_name: &str, taken: &HashSet<String>) -> String {
    let initials: String = first_name
        .split('-')
        .filter_map(|part| part.chars().next())
        .collect();
    let base = format!("{}{}", initials.to_lowercase(), last_name.to_lowercase());
    if !taken.contains(&base) {
        return base;
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Capitaliza a primeira letra de cada trecho alfabético ("jean-claude"
/// vira "Jean-Claude"). Aplicado aos nomes na gravação.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for char in name.chars() {
        if char.is_alphabetic() {
            if at_word_start {
                out.extend(char.to_uppercase());
            } else {
                out.extend(char.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(char);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn letters_hyphen_accepts_compound_names() {
        assert!(check_letters_hyphen("Jean-Claude", "first_name").is_ok());
        assert!(check_letters_hyphen("Müller", "last_name").is_ok());
    }

    #[test]
    fn letters_hyphen_rejects_digits_and_spaces() {
        assert_eq!(
            check_letters_hyphen("bond007", "last_name").unwrap_err(),
            "<last_name>: Only letters and hyphen are authorized"
        );
        assert!(check_letters_hyphen("De Tchatche", "last_name").is_err());
    }

    #[test]
    fn phone_number_must_be_digits_only() {
        assert!(check_is_phone_number("1111111111", "phone").is_ok());
        assert_eq!(
            check_is_phone_number("11111bad", "phone").unwrap_err(),
            "<phone>: A phone number can contain only numbers !"
        );
    }

    #[test]
    fn float_check_reports_field_name() {
        assert_eq!(check_is_float("2500", "amount").unwrap(), 2500.0);
        assert_eq!(
            check_is_float("abc", "amount").unwrap_err(),
            "<amount>: This field must be a float number !"
        );
    }

    #[test]
    fn weak_password_collects_both_errors() {
        let errors = is_valid_password("toto").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            "Password error : your password must contain letters and numbers"
        );
        assert_eq!(
            errors[1],
            "Password error : Your password must be at least 8 characters long!"
        );
    }

    #[test]
    fn valid_password_passes() {
        assert!(is_valid_password("toto1234").is_ok());
    }

    #[test]
    fn password_entries_compared_only_when_both_present() {
        assert!(two_entries_differ("toto1234", "toto1234").is_ok());
        assert!(two_entries_differ("", "toto1234").is_ok());
        assert_eq!(
            two_entries_differ("toto1234", "toto12345").unwrap_err(),
            "Password error : Your two entries for password differ !"
        );
    }

    #[test]
    fn team_must_be_one_of_the_three() {
        assert!(is_valid_team("Management").is_ok());
        assert!(is_valid_team("Sales").is_ok());
        assert!(is_valid_team("Support").is_ok());
        assert_eq!(
            is_valid_team("support").unwrap_err(),
            "<Team>: Team must be one of these : Management, Sales or Support"
        );
    }

    #[test]
    fn payment_due_comparison_ignores_time_of_day() {
        let created = Utc.with_ymd_and_hms(2023, 1, 18, 15, 30, 0).unwrap();
        // Mesmo dia, hora anterior: aceito
        let due_same_day = Utc.with_ymd_and_hms(2023, 1, 18, 8, 0, 0).unwrap();
        assert!(is_prior_to_created_date(due_same_day, created).is_ok());
        // Dia anterior: rejeitado
        let due_day_before = Utc.with_ymd_and_hms(2023, 1, 17, 23, 59, 0).unwrap();
        assert_eq!(
            is_prior_to_created_date(due_day_before, created).unwrap_err(),
            "Payment due date can't be prior to creation date"
        );
    }

    #[test]
    fn username_generation_is_deterministic_and_collision_free() {
        let mut taken = HashSet::new();
        assert_eq!(generate_username("James", "Bond", &taken), "jbond");
        taken.insert("jbond".to_string());
        assert_eq!(generate_username("James", "Bond", &taken), "jbond2");
        taken.insert("jbond2".to_string());
        assert_eq!(generate_username("James", "Bond", &taken), "jbond3");
    }

    #[test]
    fn username_uses_initials_of_compound_first_names() {
        let taken = HashSet::new();
        assert_eq!(generate_username("Jean-Claude", "Petit", &taken), "jcpetit");
    }

    #[test]
    fn title_case_capitalizes_each_part() {
        assert_eq!(title_case("james"), "James");
        assert_eq!(title_case("jean-claude"), "Jean-Claude");
        assert_eq!(title_case("BOND"), "Bond");
    }
}
