use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Reviews
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
	pub id: String,
	pub author: String,
	#[serde(default)]
	pub avatar: Option<String>,
	pub rating: f64,
	pub date: String,
	#[serde(default)]
	pub comment: String,
	pub source: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSynthesis {
	pub summary: String,
	#[serde(default)]
	pub strengths: Vec<String>,
	#[serde(default)]
	pub improvements: Vec<String>,
	#[serde(default)]
	pub average_rating: Option<f64>,
	pub review_count: u32,
}

impl ReviewSynthesis {
	/// True for the value returned when no holding was selected.
	pub fn is_trivial(&self) -> bool {
		self == &Self::default()
	}
}

// Rehousing notes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RehousingNoteType {
	Rehousing,
	Compensation,
	Refund,
}

/// Row of `rehousing_notes` as stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RehousingNote {
	pub id: String,
	pub user_id: String,
	pub note_type: RehousingNoteType,
	pub amount_received: f64,
	pub amount_to_transfer: f64,
	#[serde(default)]
	pub comment: Option<String>,
	pub recipient_name: String,
	pub recipient_iban: String,
	#[serde(default)]
	pub recipient_bic: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// User-supplied part of a rehousing note; `user_id` is attached at insert time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewRehousingNote {
	pub note_type: RehousingNoteType,
	pub amount_received: f64,
	pub amount_to_transfer: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	pub recipient_name: String,
	pub recipient_iban: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub recipient_bic: Option<String>,
}

// Stripe
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StripePaymentIntent {
	pub id: String,
	pub amount: i64,
	pub currency: String,
	pub status: String,
	/// Unix timestamp, seconds.
	pub created: i64,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub customer: Option<String>,
	#[serde(default)]
	pub metadata: Value,
}

// Competitive analyses
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricePositionAnalysis {
	pub user_average_price: f64,
	pub competitor_average_price: f64,
	pub competitor_count: u32,
}

impl PricePositionAnalysis {
	/// Relative gap to the competitors' average, in percent. `None` without competitors.
	pub fn gap_pct(&self) -> Option<f64> {
		if self.competitor_count == 0 || self.competitor_average_price == 0.0 {
			return None;
		}
		Some((self.user_average_price - self.competitor_average_price) / self.competitor_average_price * 100.0)
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompSetAnalysis {
	pub user_score: f64,
	pub average_competitor_score: f64,
	pub competitor_count: u32,
	pub max_score: f64,
}

// Yearly financial rollup ("bilan")
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BilanTotals {
	pub revenue: f64,
	pub expenses: f64,
	pub net_income: f64,
	#[serde(default)]
	pub nights_booked: u32,
	#[serde(default)]
	pub occupancy_rate: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BilanMonth {
	/// "YYYY-MM"
	pub month: String,
	pub revenue: f64,
	pub expenses: f64,
	pub net_income: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BilanInput {
	pub year: i32,
	pub totals: BilanTotals,
	#[serde(default)]
	pub monthly: Vec<BilanMonth>,
}

// Digital booklet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DigitalBooklet {
	#[serde(default)]
	pub id: Option<String>,
	pub user_id: String,
	pub content: Value,
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
}

// Accountant requests
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountantRequestStatus {
	Pending,
	Accepted,
	Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccountantRequest {
	pub id: String,
	pub user_id: String,
	pub status: AccountantRequestStatus,
	#[serde(default)]
	pub message: Option<String>,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NewAccountantRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

// Delegated invoice viewers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DelegatedInvoiceViewer {
	pub id: String,
	pub owner_id: String,
	pub viewer_email: String,
	pub created_at: DateTime<Utc>,
}

// Ecowatt (electrical grid status)
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum EcowattLevel {
	Green,
	Orange,
	Red,
}

impl TryFrom<u8> for EcowattLevel {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(EcowattLevel::Green),
			2 => Ok(EcowattLevel::Orange),
			3 => Ok(EcowattLevel::Red),
			other => Err(format!("unknown ecowatt level {other}")),
		}
	}
}

impl From<EcowattLevel> for u8 {
	fn from(level: EcowattLevel) -> Self {
		match level {
			EcowattLevel::Green => 1,
			EcowattLevel::Orange => 2,
			EcowattLevel::Red => 3,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EcowattSignal {
	pub day: NaiveDate,
	pub level: EcowattLevel,
	#[serde(default)]
	pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EcowattForecast {
	pub signals: Vec<EcowattSignal>,
}

impl EcowattForecast {
	/// Signal of the first day covered by the forecast.
	pub fn earliest(&self) -> Option<&EcowattSignal> {
		self.signals.iter().min_by_key(|s| s.day)
	}

	pub fn for_day(&self, day: NaiveDate) -> Option<&EcowattSignal> {
		self.signals.iter().find(|s| s.day == day)
	}
}

// Settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
	EmailTemplate,
	ContactInfo,
	CguvVersion,
	AppVersion,
	MigrationNotice,
	FaqContent,
}

impl SettingKey {
	pub const ALL: [SettingKey; 6] = [
		SettingKey::EmailTemplate,
		SettingKey::ContactInfo,
		SettingKey::CguvVersion,
		SettingKey::AppVersion,
		SettingKey::MigrationNotice,
		SettingKey::FaqContent,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			SettingKey::EmailTemplate => "email_template",
			SettingKey::ContactInfo => "contact_info",
			SettingKey::CguvVersion => "cguv_version",
			SettingKey::AppVersion => "app_version",
			SettingKey::MigrationNotice => "migration_notice",
			SettingKey::FaqContent => "faq_content",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|k| k.as_str() == raw)
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Setting {
	pub key: String,
	#[serde(default)]
	pub value: Option<Value>,
}

// Auth
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
	pub id: String,
	#[serde(default)]
	pub email: Option<String>,
}

// Outgoing mail
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EmailMessage {
	pub to: String,
	pub subject: String,
	pub html: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_setting_key_parse() {
		assert_eq!(SettingKey::parse("app_version"), Some(SettingKey::AppVersion));
		assert_eq!(SettingKey::parse("faq_content"), Some(SettingKey::FaqContent));
		assert_eq!(SettingKey::parse("unknown"), None);
	}

	#[test]
	fn test_price_gap_without_competitors() {
		let analysis = PricePositionAnalysis {
			user_average_price: 120.0,
			competitor_average_price: 0.0,
			competitor_count: 0,
		};
		assert_eq!(analysis.gap_pct(), None);

		let analysis = PricePositionAnalysis {
			user_average_price: 110.0,
			competitor_average_price: 100.0,
			competitor_count: 4,
		};
		let gap = analysis.gap_pct().unwrap();
		assert!((gap - 10.0).abs() < 1e-9);
	}

	#[test]
	fn test_comp_set_uses_camel_case() {
		let parsed: CompSetAnalysis = serde_json::from_value(json!({
			"userScore": 4.6,
			"averageCompetitorScore": 4.2,
			"competitorCount": 12,
			"maxScore": 5.0,
		}))
		.unwrap();
		assert_eq!(parsed.competitor_count, 12);
	}

	#[test]
	fn test_ecowatt_level_rejects_unknown_values() {
		let ok: EcowattSignal = serde_json::from_value(json!({
			"day": "2026-01-15",
			"level": 3,
			"message": "Coupures possibles",
		}))
		.unwrap();
		assert_eq!(ok.level, EcowattLevel::Red);

		let bad = serde_json::from_value::<EcowattSignal>(json!({"day": "2026-01-15", "level": 7}));
		assert!(bad.is_err());
	}

	#[test]
	fn test_review_synthesis_requires_summary_and_count() {
		let missing = serde_json::from_value::<ReviewSynthesis>(json!({"error": "quota exceeded"}));
		assert!(missing.is_err());

		let minimal: ReviewSynthesis =
			serde_json::from_value(json!({"summary": "RAS", "reviewCount": 0})).unwrap();
		assert!(minimal.strengths.is_empty());
		assert_eq!(minimal.average_rating, None);
	}

	#[test]
	fn test_ecowatt_forecast_lookup_by_day() {
		let forecast: EcowattForecast = serde_json::from_value(json!({"signals": [
			{"day": "2026-01-16", "level": 2},
			{"day": "2026-01-15", "level": 1},
		]}))
		.unwrap();

		let day = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
		assert_eq!(forecast.for_day(day).unwrap().level, EcowattLevel::Orange);
		assert_eq!(forecast.earliest().unwrap().level, EcowattLevel::Green);
		assert!(serde_json::from_value::<EcowattForecast>(json!({})).is_err());
	}

	#[test]
	fn test_review_synthesis_default_is_trivial() {
		assert!(ReviewSynthesis::default().is_trivial());
		let non_trivial = ReviewSynthesis {
			review_count: 3,
			..Default::default()
		};
		assert!(!non_trivial.is_trivial());
	}
}
