use crate::config::AppConfig;
use crate::domain::model::{EmailMessage, Participant, Winner};

/// Plain-text email templates for the raffle.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    pub campaign_name: String,
    pub organizer: String,
    pub frontend_url: String,
}

impl MessageTemplates {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            campaign_name: config.raffle.campaign_name.clone(),
            organizer: config.raffle.organizer.clone(),
            frontend_url: config.mail.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn verification_link(&self, participant: &Participant) -> String {
        format!("{}/verify/{}", self.frontend_url, participant.verification_token)
    }

    pub fn verification_email(&self, participant: &Participant) -> EmailMessage {
        let text_body = format!(
            "Hello {name}!\n\n\
             Thank you for registering for the {campaign}.\n\n\
             To complete your registration and enter the draw, please verify your \
             email address by opening the following link:\n\n\
             {link}\n\n\
             Once your email is verified you will be able to create your password \
             and confirm your participation.\n\n\
             Good luck!\n\n\
             ---\n\
             {organizer}\n",
            name = participant.full_name,
            campaign = self.campaign_name,
            link = self.verification_link(participant),
            organizer = self.organizer,
        );

        EmailMessage {
            to_email: participant.email.clone(),
            to_name: Some(participant.full_name.clone()),
            subject: format!("Verify your email - {}", self.campaign_name),
            text_body,
        }
    }

    pub fn winner_email(&self, participant: &Participant, winner: &Winner) -> EmailMessage {
        let text_body = format!(
            "CONGRATULATIONS {name}!\n\n\
             You are the winner of the {campaign}!\n\n\
             Your prize:\n\
             {prize}\n\n\
             Next steps:\n\
             We will contact you within the next 24-48 hours at {phone} \
             to arrange the details of your prize.\n\n\
             Enjoy your prize!\n\n\
             ---\n\
             {organizer}\n",
            name = participant.full_name,
            campaign = self.campaign_name,
            prize = winner.prize_description,
            phone = participant.phone,
            organizer = self.organizer,
        );

        EmailMessage {
            to_email: participant.email.clone(),
            to_name: Some(participant.full_name.clone()),
            subject: format!("Congratulations! You won the {}", self.campaign_name),
            text_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn templates() -> MessageTemplates {
        MessageTemplates {
            campaign_name: "Valentine's Day Raffle".to_string(),
            organizer: "CTS Turismo".to_string(),
            frontend_url: "https://sorteo.example.cl".to_string(),
        }
    }

    #[test]
    fn test_verification_email_links_to_token() {
        let p = Participant::new(
            "maria@gmail.com".to_string(),
            "María González".to_string(),
            "+56987654321".to_string(),
            Utc::now(),
        );
        let msg = templates().verification_email(&p);

        assert_eq!(msg.to_email, "maria@gmail.com");
        assert!(msg.subject.contains("Verify your email"));
        assert!(msg
            .text_body
            .contains(&format!("https://sorteo.example.cl/verify/{}", p.verification_token)));
    }

    #[test]
    fn test_winner_email_mentions_prize_and_phone() {
        let p = Participant::new(
            "diego@gmail.com".to_string(),
            "Diego Fernández".to_string(),
            "+56934567890".to_string(),
            Utc::now(),
        );
        let w = Winner::new(p.id, None, "Weekend for two".to_string(), Utc::now());
        let msg = templates().winner_email(&p, &w);

        assert!(msg.text_body.contains("Weekend for two"));
        assert!(msg.text_body.contains("+56934567890"));
        assert!(msg.text_body.starts_with("CONGRATULATIONS Diego Fernández!"));
    }
}
