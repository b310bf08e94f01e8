// ABOUTME: Keyword-based ingredient categorizer for the shopping list
// ABOUTME: Categories are checked in a fixed priority order and the first match wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use std::cmp::Ordering;

use crate::models::{AggregatedIngredient, CategorizedShoppingList, CategoryGroup, IngredientCategory};

const PROTEINS: &[&str] = &[
    "chicken", "beef", "turkey", "pork", "lamb", "salmon", "tuna", "cod", "fish", "shrimp",
    "prawn", "eggs", " egg ", "egg white", "egg yolk", "tofu", "tempeh", "seitan", "lentil",
    "chickpea", "black beans", "kidney beans", "edamame", "protein", "bacon", "sausage",
];

const GRAINS: &[&str] = &[
    "rice", "oats", "oatmeal", "quinoa", "bread", "pasta", "noodle", "tortilla", "granola",
    "wheat", "barley", "couscous", "cereal", "grain", "flour", "cracker", "bagel",
];

const VEGETABLES: &[&str] = &[
    "broccoli", "spinach", "kale", "lettuce", "greens", "tomato", "cucumber", "carrot",
    "onion", "garlic", "asparagus", "bell pepper", "zucchini", "eggplant", "celery",
    "potato", "green bean", "snap peas", "peas", "cabbage", "cauliflower", "mushroom",
    "beet", "squash", "vegetable",
];

const FRUITS: &[&str] = &[
    "apple", "banana", "berry", "berries", "orange", "lemon", "lime", "grape", "mango",
    "pear", "peach", "avocado", "melon", "kiwi", "raisin", "plum", "fruit",
];

const DAIRY: &[&str] = &[
    "milk", "cheese", "yogurt", "yoghurt", "butter", "cream", "feta", "mozzarella",
    "parmesan", "ricotta", "kefir",
];

const NUTS: &[&str] = &[
    "almond", "walnut", "peanut", "cashew", "pecan", "pistachio", "hazelnut", "nuts",
    "seed", "chia", "flax",
];

const CONDIMENTS: &[&str] = &[
    "salt", "pepper", " oil ", "vinegar", "sauce", "honey", "mustard", "spice", "herb",
    "cinnamon", "turmeric", "dressing", "tahini", "ketchup", "mayonnaise", "sugar", "syrup",
    "basil", "curry", "ginger", "yeast", "paprika", "cumin", "oregano",
];

/// Keyword table in priority order
///
/// Names are matched with a space on either side, so a keyword with
/// surrounding spaces only matches a whole word (`" egg "` skips "eggplant").
const KEYWORDS: &[(IngredientCategory, &[&str])] = &[
    (IngredientCategory::Proteins, PROTEINS),
    (IngredientCategory::Grains, GRAINS),
    (IngredientCategory::Vegetables, VEGETABLES),
    (IngredientCategory::Fruits, FRUITS),
    (IngredientCategory::Dairy, DAIRY),
    (IngredientCategory::Nuts, NUTS),
    (IngredientCategory::Condiments, CONDIMENTS),
];

/// Category of an ingredient name; never fails, unmatched names are `Others`
#[must_use]
pub fn categorize(name: &str) -> IngredientCategory {
    let padded = format!(" {} ", name.to_lowercase());
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| padded.contains(k)))
        .map_or(IngredientCategory::Others, |(category, _)| *category)
}

/// Group `items` by category in category order, dropping empty categories
///
/// Items within a group are ordered by descending quantity; equal quantities
/// keep their input order.
#[must_use]
pub fn group_by_category(items: Vec<AggregatedIngredient>) -> CategorizedShoppingList {
    let mut groups: Vec<CategoryGroup> = IngredientCategory::ALL
        .iter()
        .map(|category| CategoryGroup {
            category: *category,
            items: Vec::new(),
        })
        .collect();

    for item in items {
        let category = categorize(&item.name);
        if let Some(group) = groups.iter_mut().find(|g| g.category == category) {
            group.items.push(item);
        }
    }

    for group in &mut groups {
        group
            .items
            .sort_by(|a, b| b.quantity.partial_cmp(&a.quantity).unwrap_or(Ordering::Equal));
    }
    groups.retain(|g| !g.items.is_empty());

    CategorizedShoppingList { categories: groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category_has_a_representative() {
        assert_eq!(categorize("Chicken Breast"), IngredientCategory::Proteins);
        assert_eq!(categorize("brown rice"), IngredientCategory::Grains);
        assert_eq!(categorize("Sweet Potato"), IngredientCategory::Vegetables);
        assert_eq!(categorize("mixed berries"), IngredientCategory::Fruits);
        assert_eq!(categorize("Greek yogurt"), IngredientCategory::Dairy);
        assert_eq!(categorize("walnuts"), IngredientCategory::Nuts);
        assert_eq!(categorize("olive oil"), IngredientCategory::Condiments);
        assert_eq!(categorize("water"), IngredientCategory::Others);
        assert_eq!(categorize(""), IngredientCategory::Others);
    }

    #[test]
    fn test_earlier_category_wins() {
        // chickpeas also contains "peas"
        assert_eq!(categorize("chickpeas"), IngredientCategory::Proteins);
        assert_eq!(categorize("cherry tomatoes"), IngredientCategory::Vegetables);
        assert_eq!(categorize("almond milk"), IngredientCategory::Dairy);
        assert_eq!(categorize("eggplant"), IngredientCategory::Vegetables);
        assert_eq!(categorize("Grilled Eggplant"), IngredientCategory::Vegetables);
    }

    #[test]
    fn test_keywords_do_not_match_inside_unrelated_words() {
        assert_eq!(categorize("egg"), IngredientCategory::Proteins);
        assert_eq!(categorize("Boiled egg"), IngredientCategory::Proteins);
        assert_eq!(categorize("egg yolk"), IngredientCategory::Proteins);
        assert_eq!(categorize("goat cheese"), IngredientCategory::Dairy);
        assert_eq!(categorize("boiled potatoes"), IngredientCategory::Vegetables);
        assert_eq!(categorize("oatmeal"), IngredientCategory::Grains);
        assert_eq!(categorize("rolled oats"), IngredientCategory::Grains);
        assert_eq!(categorize("Olive Oil"), IngredientCategory::Condiments);
        assert_eq!(categorize("sesame oil"), IngredientCategory::Condiments);
        assert_eq!(categorize("soil"), IngredientCategory::Others);
    }

    #[test]
    fn test_every_keyword_maps_to_its_category_or_an_earlier_one() {
        for (index, (category, keywords)) in KEYWORDS.iter().enumerate() {
            for keyword in *keywords {
                let found = categorize(keyword);
                let position = KEYWORDS.iter().position(|(c, _)| *c == found).unwrap_or(usize::MAX);
                assert!(position <= index, "{keyword} mapped to {found}");
                if position == index {
                    assert_eq!(found, *category);
                }
            }
        }
    }

    #[test]
    fn test_groups_sorted_by_descending_quantity() {
        let list = group_by_category(vec![
            AggregatedIngredient::new("rice", 2.0, None),
            AggregatedIngredient::new("salmon", 1.0, None),
            AggregatedIngredient::new("oats", 5.0, None),
            AggregatedIngredient::new("chicken", 3.0, None),
            AggregatedIngredient::new("water", 1.0, None),
        ]);

        let categories: Vec<_> = list.categories.iter().map(|g| g.category).collect();
        assert_eq!(
            categories,
            [IngredientCategory::Proteins, IngredientCategory::Grains, IngredientCategory::Others]
        );
        for group in &list.categories {
            assert!(group.items.windows(2).all(|w| w[0].quantity >= w[1].quantity));
        }
        assert_eq!(list.categories[1].items[0].name, "oats");
        assert_eq!(list.item_count(), 5);
    }

    #[test]
    fn test_empty_input_gives_empty_list() {
        assert!(group_by_category(Vec::new()).is_empty());
    }
}
