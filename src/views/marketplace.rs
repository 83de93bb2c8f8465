//! Marketplace page: filtered listing cards, price chart and contact cards.

use super::charts::{ChartKind, ChartSpec, Dataset, render_text};
use super::widgets::WidgetKind;
use super::{ViewContext, WidgetRef};
use crate::commands::Output;
use crate::models::MarketplaceListing;
use crate::state::AppState;
use serde::Serialize;

pub const NO_MATCHES_MESSAGE: &str = "No listings found matching your criteria.";
pub const NO_PHONE_MESSAGE: &str = "No phone number provided.";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200?text=AgriPulse+Product";

/// Category and free-text filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketplaceQuery {
    /// "all" or a category, compared without regard to case
    pub category: String,
    pub search: String,
}

impl Default for MarketplaceQuery {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            search: String::new(),
        }
    }
}

impl MarketplaceQuery {
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        Self {
            category: category.unwrap_or("all").trim().to_lowercase(),
            search: search.unwrap_or_default().to_string(),
        }
    }

    /// Category must match (or be "all") AND the search text must appear in
    /// the title, description or seller. Both comparisons ignore case.
    pub fn matches(&self, listing: &MarketplaceListing) -> bool {
        let wanted = category_key(&self.category);
        let category_match = wanted == "all" || category_key(&listing.category) == wanted;
        let needle = self.search.to_lowercase();
        let search_match = listing.title.to_lowercase().contains(&needle)
            || listing.description.to_lowercase().contains(&needle)
            || listing.seller.to_lowercase().contains(&needle);
        category_match && search_match
    }
}

fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

pub fn filter_listings<'a>(
    listings: &'a [MarketplaceListing],
    query: &MarketplaceQuery,
) -> Vec<&'a MarketplaceListing> {
    listings.iter().filter(|l| query.matches(l)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: u64,
    /// e.g. "Ksh 5,500"
    pub price_label: String,
    pub seller: String,
    pub img: String,
    /// Supplier suggested by the last diagnosis
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketplaceView {
    pub query: MarketplaceQuery,
    pub listings: Vec<ListingCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    pub price_chart: ChartSpec,
}

impl MarketplaceView {
    pub fn widgets(&self) -> Vec<WidgetRef> {
        vec![WidgetRef::new(&self.price_chart.id, WidgetKind::Chart)]
    }
}

pub fn render(state: &AppState, ctx: &ViewContext) -> MarketplaceView {
    let listings: Vec<ListingCard> = filter_listings(&state.listings, &ctx.market_query)
        .into_iter()
        .map(|l| ListingCard {
            id: l.id.clone(),
            title: l.title.clone(),
            category: l.category.clone(),
            price: l.price,
            price_label: format!("Ksh {}", group_thousands(l.price)),
            seller: l.seller.clone(),
            img: if l.img.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                l.img.clone()
            },
            recommended: ctx.suggested_vendor_id.as_deref() == Some(l.id.as_str()),
        })
        .collect();
    MarketplaceView {
        query: ctx.market_query.clone(),
        empty_message: listings.is_empty().then(|| NO_MATCHES_MESSAGE.to_string()),
        listings,
        price_chart: price_discovery_chart(),
    }
}

pub fn price_discovery_chart() -> ChartSpec {
    ChartSpec::new(
        "price-discovery-chart",
        "Local Price Discovery",
        ChartKind::Line,
        &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    )
    .dataset(Dataset::new(
        "Local Maize Price (KSh/Bag)",
        vec![3800.0, 3850.0, 3900.0, 3900.0, 4000.0, 3950.0, 3980.0],
        "#3B82F6",
    ))
    .without_legend()
}

/// Ways to reach a seller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactCard {
    pub listing_id: String,
    pub title: String,
    pub seller: String,
    pub email: String,
    pub mailto: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_phone_message: Option<String>,
}

pub fn contact_card(listing: &MarketplaceListing) -> ContactCard {
    let present = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let whatsapp = present(&listing.whatsapp);
    let phone = present(&listing.phone);
    ContactCard {
        listing_id: listing.id.clone(),
        title: listing.title.clone(),
        seller: listing.seller.clone(),
        email: listing.email.clone(),
        mailto: format!("mailto:{}", listing.email),
        whatsapp_link: whatsapp.map(|n| format!("https://wa.me/{}", n)),
        phone_link: phone.as_ref().map(|p| format!("tel:{}", p)),
        no_phone_message: phone.is_none().then(|| NO_PHONE_MESSAGE.to_string()),
        phone,
    }
}

/// Format with comma thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl Output for MarketplaceView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(message) = &self.empty_message {
            lines.push(message.clone());
        }
        for card in &self.listings {
            lines.push(format!(
                "{}  {}{}  {}  Seller: {}",
                card.id,
                card.title,
                if card.recommended { " * Recommended" } else { "" },
                card.price_label,
                card.seller
            ));
        }
        lines.push(String::new());
        lines.push(render_text(&self.price_chart));
        lines.join("\n")
    }
}

impl Output for ContactCard {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{} - {}", self.seller, self.title),
            format!("  Email:    {}", self.email),
        ];
        if let Some(link) = &self.whatsapp_link {
            lines.push(format!("  WhatsApp: {}", link));
        }
        match (&self.phone, &self.no_phone_message) {
            (Some(phone), _) => lines.push(format!("  Phone:    {}", phone)),
            (None, Some(message)) => lines.push(format!("  {}", message)),
            (None, None) => {}
        }
        lines.join("\n")
    }
}
