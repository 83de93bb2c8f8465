//! Seed data used when a storage slot has never been written.

use super::{Field, FieldType, InventoryItem, MarketplaceListing, Priority, Task};

pub fn default_fields() -> Vec<Field> {
    vec![
        Field {
            id: "maize-field-1".to_string(),
            name: "Maize Field 1".to_string(),
            field_type: FieldType::Crop,
            subtype: "Maize".to_string(),
            status: "Growing".to_string(),
            lat: -1.286389,
            lon: 36.817223,
            boundary: vec![
                [-1.28, 36.81],
                [-1.29, 36.81],
                [-1.29, 36.82],
                [-1.28, 36.82],
            ],
        },
        Field {
            id: "poultry-coop-1".to_string(),
            name: "Poultry Coop 1".to_string(),
            field_type: FieldType::Livestock,
            subtype: "Broilers".to_string(),
            status: "Active".to_string(),
            lat: -0.416667,
            lon: 36.933333,
            boundary: vec![[-0.41, 36.93], [-0.41, 36.94], [-0.42, 36.94]],
        },
    ]
}

pub fn default_listings() -> Vec<MarketplaceListing> {
    vec![
        MarketplaceListing {
            id: "list-1".to_string(),
            title: "Azoxystrobin Fungicide 1L".to_string(),
            category: "pesticide".to_string(),
            price: 5500,
            description:
                "Broad-spectrum fungicide effective against Maize Leaf Blight. High concentration."
                    .to_string(),
            seller: "AgroChemicals Ltd.".to_string(),
            email: "sales@agrochemicals.com".to_string(),
            whatsapp: Some("254700100200".to_string()),
            phone: Some("020222333".to_string()),
            img: "https://images.unsplash.com/photo-1594318029517-f584e27f4d43?w=400".to_string(),
        },
        MarketplaceListing {
            id: "list-2".to_string(),
            title: "Urea Fertilizer (50kg Bag)".to_string(),
            category: "fertilizer".to_string(),
            price: 7800,
            description: "High quality 46-0-0 Urea for top dressing.".to_string(),
            seller: "Farm Input Depot".to_string(),
            email: "info@farmdepot.co.ke".to_string(),
            whatsapp: Some("254711222333".to_string()),
            phone: Some("020444555".to_string()),
            img: "https://images.unsplash.com/photo-1549487950-8a719c2f689e?w=400".to_string(),
        },
    ]
}

pub fn default_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            field_id: "maize-field-1".to_string(),
            title: "Irrigation Check".to_string(),
            date: "2025-10-15".to_string(),
            priority: Priority::High,
            completed: false,
            recommended: true,
        },
        Task {
            id: 2,
            field_id: "poultry-coop-1".to_string(),
            title: "Vaccinate Broilers".to_string(),
            date: "2025-10-18".to_string(),
            priority: Priority::High,
            completed: false,
            recommended: false,
        },
        Task {
            id: 3,
            field_id: "maize-field-1".to_string(),
            title: "Apply Top Dressing Fertilizer".to_string(),
            date: "2025-10-22".to_string(),
            priority: Priority::Medium,
            completed: true,
            recommended: false,
        },
    ]
}

pub fn default_inventory() -> Vec<InventoryItem> {
    let item = |id, name: &str, category: &str, quantity, unit: &str, unit_cost, critical_level| {
        InventoryItem {
            id,
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            unit: unit.to_string(),
            unit_cost,
            critical_level,
        }
    };
    vec![
        item(1, "Urea (50kg)", "Fertilizer", 50.0, "bags", 7800.0, 10.0),
        item(2, "Maize Seed (25kg)", "Seeds", 5.0, "bags", 4500.0, 2.0),
        item(3, "Diesel", "Fuel", 150.0, "litres", 185.0, 50.0),
        item(4, "Chicken Feed", "Feed", 20.0, "bags", 3200.0, 5.0),
    ]
}
