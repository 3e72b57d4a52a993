use chrono::{Duration, NaiveDateTime};

use inboxpilot_core::domain::email::{Email, EmailId, Timestamp};

use crate::files::{JsonStore, StoreError};

struct SampleEmail {
    sender: &'static str,
    subject: &'static str,
    body: &'static str,
    hours_ago: i64,
    minutes_ago: i64,
}

/// Static sample inbox spread across spam, important, newsletter, to-do and
/// personal mail.
const SAMPLE_EMAILS: &[SampleEmail] = &[
    SampleEmail {
        sender: "lottery@international-prize.com",
        subject: "CONGRATULATIONS! You've Won $5,000,000 USD",
        body: "Dear Lucky Winner,\n\nYour email address was selected in our International Lottery draw.\nTo claim your prize, reply with your bank account details and a processing fee of $500.\n\nAct now or lose your winnings!\nInternational Lottery Commission",
        hours_ago: 2,
        minutes_ago: 14,
    },
    SampleEmail {
        sender: "crypto-gains@invest-now.biz",
        subject: "Make $10K/Day with This Secret Crypto Strategy!",
        body: "Hi there,\n\nThis is NOT a scam. Our automated trading bot guarantees profits.\nOnly 50 spots left, claim yours today!\n\nMike\nCrypto Trading Expert",
        hours_ago: 5,
        minutes_ago: 40,
    },
    SampleEmail {
        sender: "client.manager@techcorp.com",
        subject: "URGENT: Project Deadline Extended to EOD Tomorrow",
        body: "Hi Team,\n\nThe client agreed to move the deadline by 24 hours.\n1. Finish code reviews by 6 PM today\n2. QA must complete regression testing by 9 AM tomorrow\n3. Final deployment by 5 PM tomorrow\n\nPlease confirm receipt. This is our top priority.\n\nSarah Mitchell\nProject Manager",
        hours_ago: 1,
        minutes_ago: 5,
    },
    SampleEmail {
        sender: "security@company.com",
        subject: "CRITICAL: Security Breach Detected",
        body: "We detected unauthorized access attempts on the employee database.\n\nChange your password immediately, enable two-factor authentication and review your recent account activity.\nAll employees must complete security training by end of week.\n\nCraig Williams\nCISO",
        hours_ago: 3,
        minutes_ago: 30,
    },
    SampleEmail {
        sender: "ceo@company.com",
        subject: "Board Meeting Preparation - Need Your Input by EOD",
        body: "Hi,\n\nI'm presenting Q4 results to the board tomorrow.\nPlease send me by 5 PM today: revenue figures, key metrics, budget variance and Q1 projections.\n\nThanks,\nDavid Chen\nCEO",
        hours_ago: 6,
        minutes_ago: 12,
    },
    SampleEmail {
        sender: "legal@company.com",
        subject: "GDPR Compliance Audit - Documentation Due Friday",
        body: "Dear Department Heads,\n\nWe were selected for a GDPR audit. Submit data processing records and consent evidence by Friday.\nThis is a mandatory request with a hard deadline.\n\nJennifer Park\nHead of Legal",
        hours_ago: 20,
        minutes_ago: 45,
    },
    SampleEmail {
        sender: "newsletter@techweekly.io",
        subject: "Tech Weekly: AI Agents Transform Software Development",
        body: "Welcome to Tech Weekly!\n\nThis week's top stories: AI coding agents, foldable phones and new IoT vulnerabilities.\n\nRead the full stories at techweekly.io\nUnsubscribe | Manage Preferences",
        hours_ago: 30,
        minutes_ago: 0,
    },
    SampleEmail {
        sender: "updates@crm-vendor.com",
        subject: "Winter Release: What's New",
        body: "Hi Customer,\n\nThe winter release brings predictive lead scoring, faster APIs and new dashboard templates.\nProduction rollout starts next week.\n\nUnsubscribe from product updates at any time.",
        hours_ago: 44,
        minutes_ago: 20,
    },
    SampleEmail {
        sender: "calendar@company.com",
        subject: "Meeting Invitation: Q4 Planning Session",
        body: "You're invited to a meeting.\n\nQ4 Budget Planning Session, Thursday 2:00 PM - 4:00 PM, Conference Room 5B.\nPlease review the attached budget template before the session.\n\nRSVP to accept or decline.",
        hours_ago: 9,
        minutes_ago: 55,
    },
    SampleEmail {
        sender: "github@notifications.com",
        subject: "Code Review Requested: Pull Request #402",
        body: "Review requested on #402 - Implement new authentication flow.\nThis PR blocks next Tuesday's release, please review ASAP.\n\nApprove | Request Changes",
        hours_ago: 12,
        minutes_ago: 8,
    },
    SampleEmail {
        sender: "manager@company.com",
        subject: "Action Required: Approve Marketing Budget Proposal",
        body: "Hi,\n\nI've submitted the Q1 marketing budget proposal. Please review and approve by December 1st so we can finalize vendor contracts.\n\nThanks,\nAmanda Roberts",
        hours_ago: 26,
        minutes_ago: 33,
    },
    SampleEmail {
        sender: "finance@company.com",
        subject: "Reminder: Submit November Expense Reports by Friday",
        body: "Dear Team,\n\nAll November expense reports must be submitted by Friday.\nUpload receipts for expenses over $25 and submit for manager approval.\n\nFinance Department",
        hours_ago: 50,
        minutes_ago: 17,
    },
    SampleEmail {
        sender: "friend@gmail.com",
        subject: "Happy Birthday!",
        body: "Hey!\n\nHappy Birthday! Hope you have an amazing day with family and friends.\nDinner this weekend? My treat!\n\nCheers,\nAlex",
        hours_ago: 60,
        minutes_ago: 2,
    },
    SampleEmail {
        sender: "colleague@company.com",
        subject: "Lunch today?",
        body: "Hey,\n\nWant to grab lunch around 12:30? There's a new taco place downtown.\n\n- Mike",
        hours_ago: 4,
        minutes_ago: 48,
    },
    SampleEmail {
        sender: "travel.buddy@outlook.com",
        subject: "FWD: 10 Hidden Gems in Tokyo",
        body: "Saw this article and thought of you since you mentioned visiting Japan next year.\nYanaka Ginza, Shimokitazawa and Koenji are on the list.\n\nSarah",
        hours_ago: 71,
        minutes_ago: 10,
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub emails_seeded: usize,
}

/// Sample inbox with ids `1..=N`, unread and uncategorized, timestamped
/// relative to `now`.
pub struct MockInbox;

impl MockInbox {
    pub fn emails(now: NaiveDateTime) -> Vec<Email> {
        SAMPLE_EMAILS
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                let sent_at =
                    now - Duration::hours(sample.hours_ago) - Duration::minutes(sample.minutes_ago);
                Email::new(
                    EmailId(index as u64 + 1),
                    sample.sender,
                    sample.subject,
                    sample.body,
                    Some(Timestamp::Parsed(sent_at)),
                )
            })
            .collect()
    }

    pub fn count() -> usize {
        SAMPLE_EMAILS.len()
    }

    /// Replaces the stored inbox with the sample emails.
    pub async fn load(store: &JsonStore, now: NaiveDateTime) -> Result<SeedResult, StoreError> {
        let emails = Self::emails(now);
        store.save_emails(&emails).await?;
        Ok(SeedResult { emails_seeded: emails.len() })
    }
}
