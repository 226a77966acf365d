//! Built-in clothing templates.

/// A garment image the user can start a design from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClothingTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub image_path: &'static str,
}

pub const CLOTHING_TEMPLATES: [ClothingTemplate; 4] = [
    ClothingTemplate {
        id: "1",
        name: "Multi Colored Full Sleeves T-Shirt",
        image_path: "Clothes/Full_sleeve.webp",
    },
    ClothingTemplate {
        id: "2",
        name: "Grey Hoodie",
        image_path: "Clothes/101-1017710_hoodie-grey-hoodie-front-and-back.webp",
    },
    ClothingTemplate {
        id: "3",
        name: "White Sweat Shirt",
        image_path: "Clothes/isolated-t-shirt-1852114_1280.webp",
    },
    ClothingTemplate {
        id: "4",
        name: "Red Collared T-Shirt",
        image_path: "Clothes/red_collared_t-shirt.webp",
    },
];

/// Look up a built-in template by id.
pub fn find_template(id: &str) -> Option<&'static ClothingTemplate> {
    CLOTHING_TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(CLOTHING_TEMPLATES.len(), 4);
        assert_eq!(find_template("2").map(|t| t.name), Some("Grey Hoodie"));
        assert!(find_template("9").is_none());
        assert!(CLOTHING_TEMPLATES.iter().all(|t| t.image_path.starts_with("Clothes/")));
    }
}
