// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Authentication token is invalid or missing."),
    ("forbidden", "You are not allowed to perform this action."),
    ("profile_not_found", "Profile information not found."),
    ("user_not_found", "User not found."),
    ("missing_id", "ID not found"),
    ("weak_password", "Password must be at least 6 characters."),
    ("company_not_found", "Company not found."),
    ("company_has_tasks", "This company still has tasks and cannot be deleted."),
    ("task_not_found", "Task not found."),
    ("task_already_completed", "This task is already completed."),
    ("invalid_assignee", "Tasks can only be assigned to workers."),
    ("missing_photo", "Please attach a completion photo."),
    ("invalid_service_fee", "Service fee must be a non-negative number below 10,000,000,000."),
    ("finance_entry_not_found", "Finance entry not found."),
    ("invalid_form", "The submitted form could not be read."),
    ("payload_too_large", "The upload is too large."),
    ("invalid_image", "The photo could not be processed."),
    ("photo_too_large", "The photo resolution is too high."),
    ("invalid_object_name", "Invalid file name."),
    ("object_not_found", "File not found."),
    ("invalid_period", "Month must be 'all' or YYYY-MM."),
    ("internal_error", "An unexpected error occurred."),
];

const TR: &[(&str, &str)] = &[
    ("validation_failed", "Bir veya daha fazla alan geçersiz."),
    ("email_already_exists", "Bu e-posta zaten kullanımda."),
    ("invalid_credentials", "E-posta veya şifre hatalı."),
    ("invalid_token", "Oturum anahtarı geçersiz veya eksik."),
    ("forbidden", "Bu işlem için yetkiniz yok."),
    ("profile_not_found", "Profil bilgisi bulunamadı!"),
    ("user_not_found", "Kullanıcı bulunamadı."),
    ("missing_id", "ID bulunamadı"),
    ("weak_password", "Şifre en az 6 karakter olmalıdır."),
    ("company_not_found", "Firma bulunamadı."),
    ("company_has_tasks", "Bu firmaya bağlı görevler var, silinemez."),
    ("task_not_found", "Görev bulunamadı."),
    ("task_already_completed", "Bu görev zaten tamamlandı."),
    ("invalid_assignee", "Görevler yalnızca personele atanabilir."),
    ("missing_photo", "Lütfen iş sonu fotoğrafı ekleyin."),
    ("invalid_service_fee", "Hizmet ücreti 10.000.000.000 altında, negatif olmayan bir sayı olmalıdır."),
    ("finance_entry_not_found", "Finans kaydı bulunamadı."),
    ("invalid_form", "Gönderilen form okunamadı."),
    ("payload_too_large", "Yüklenen dosya çok büyük."),
    ("invalid_image", "Fotoğraf işlenemedi."),
    ("photo_too_large", "Fotoğraf çözünürlüğü çok yüksek."),
    ("invalid_object_name", "Geçersiz dosya adı."),
    ("object_not_found", "Dosya bulunamadı."),
    ("invalid_period", "Ay 'all' veya YYYY-AA biçiminde olmalıdır."),
    ("internal_error", "Beklenmeyen bir hata oluştu."),
];

/// Tabelas de mensagens por idioma (código primário: "en", "tr").
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn builtin() -> Self {
        let mut messages = HashMap::new();
        for (lang, table) in [("en", EN), ("tr", TR)] {
            let entries = table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            messages.insert(lang.to_string(), entries);
        }
        Self { messages }
    }

    // Idioma pedido -> inglês -> a própria chave
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .find_map(|l| self.messages.get(*l).and_then(|table| table.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
