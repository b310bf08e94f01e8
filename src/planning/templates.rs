// ABOUTME: Static meal templates used by the rule-based planner
// ABOUTME: Standard, vegetarian, vegan, low-sodium, and diabetic meal sets plus selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

use crate::models::{Meal, NutritionInfo, Patient};

/// Maximum sodium (mg) of a template in the low-sodium set
const LOW_SODIUM_CAP: f64 = 200.0;

/// Candidate meals for each slot of a day
#[derive(Debug, Clone, PartialEq)]
pub struct MealSet {
    /// Breakfast options
    pub breakfast: Vec<Meal>,
    /// Lunch options
    pub lunch: Vec<Meal>,
    /// Dinner options
    pub dinner: Vec<Meal>,
    /// Snack options
    pub snacks: Vec<Meal>,
}

impl MealSet {
    fn all_meals_mut(&mut self) -> impl Iterator<Item = &mut Meal> {
        self.breakfast
            .iter_mut()
            .chain(self.lunch.iter_mut())
            .chain(self.dinner.iter_mut())
            .chain(self.snacks.iter_mut())
    }
}

/// Which template set fits a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealSetKind {
    /// No particular needs
    Standard,
    /// No meat or fish
    Vegetarian,
    /// No animal products
    Vegan,
    /// Sodium capped
    LowSodium,
    /// Fewer carbohydrates, more fiber and protein
    Diabetic,
}

impl MealSetKind {
    /// Pick the set for `patient`
    ///
    /// Restrictions win over conditions: vegan, vegetarian, then diabetes,
    /// then low-sodium or hypertension.
    #[must_use]
    pub fn for_patient(patient: &Patient) -> Self {
        if patient.has_restriction("vegan") {
            Self::Vegan
        } else if patient.has_restriction("vegetarian") {
            Self::Vegetarian
        } else if patient.has_condition(&["diabetes", "diabetic"]) {
            Self::Diabetic
        } else if patient.has_restriction("low-sodium") || patient.has_condition(&["hypertension"]) {
            Self::LowSodium
        } else {
            Self::Standard
        }
    }

    /// Materialize the template set
    #[must_use]
    pub fn meal_set(self) -> MealSet {
        match self {
            Self::Standard => standard_meals(),
            Self::Vegetarian => vegetarian_meals(),
            Self::Vegan => vegan_meals(),
            Self::LowSodium => low_sodium_meals(),
            Self::Diabetic => diabetic_meals(),
        }
    }
}

fn template(
    name: &str,
    description: &str,
    ingredients: &[&str],
    nutrition: NutritionInfo,
    preparation_time: u32,
    difficulty: &str,
) -> Meal {
    Meal {
        description: description.to_owned(),
        ingredients: ingredients.iter().map(|s| (*s).to_owned()).collect(),
        nutrition,
        preparation_time,
        difficulty: difficulty.to_owned(),
        ..Meal::named(name)
    }
}

const fn n(calories: u32, protein: f64, carbs: f64, fat: f64, fiber: f64, sodium: f64) -> NutritionInfo {
    NutritionInfo::new(calories, protein, carbs, fat, fiber, sodium)
}

/// The base set every other set except vegan derives from
#[must_use]
pub fn standard_meals() -> MealSet {
    MealSet {
        breakfast: vec![
            template(
                "Greek Yogurt Parfait",
                "Protein-rich parfait with berries and granola",
                &["Greek yogurt", "mixed berries", "granola", "honey"],
                n(350, 20.0, 45.0, 10.0, 5.0, 100.0),
                10,
                "easy",
            ),
            template(
                "Scrambled Eggs with Toast",
                "Classic eggs with whole wheat toast and avocado",
                &["eggs", "whole wheat bread", "avocado", "butter", "salt", "pepper"],
                n(400, 22.0, 35.0, 18.0, 8.0, 400.0),
                15,
                "easy",
            ),
            template(
                "Oatmeal Bowl",
                "Steel-cut oats with banana and almonds",
                &["steel-cut oats", "banana", "almonds", "cinnamon", "honey"],
                n(380, 12.0, 58.0, 12.0, 10.0, 5.0),
                20,
                "easy",
            ),
        ],
        lunch: vec![
            template(
                "Grilled Chicken Salad",
                "Mixed greens with grilled chicken breast",
                &[
                    "chicken breast",
                    "mixed greens",
                    "cherry tomatoes",
                    "cucumber",
                    "olive oil",
                    "balsamic vinegar",
                ],
                n(450, 40.0, 25.0, 22.0, 6.0, 350.0),
                25,
                "medium",
            ),
            template(
                "Turkey Wrap",
                "Whole wheat wrap with turkey and vegetables",
                &["whole wheat tortilla", "turkey breast", "lettuce", "tomato", "cheese", "mustard"],
                n(420, 35.0, 40.0, 15.0, 5.0, 800.0),
                10,
                "easy",
            ),
            template(
                "Quinoa Buddha Bowl",
                "Quinoa with roasted vegetables and chickpeas",
                &["quinoa", "chickpeas", "sweet potato", "broccoli", "tahini dressing"],
                n(480, 18.0, 65.0, 16.0, 12.0, 300.0),
                30,
                "medium",
            ),
        ],
        dinner: vec![
            template(
                "Baked Salmon with Vegetables",
                "Herb-crusted salmon with roasted vegetables",
                &["salmon fillet", "asparagus", "bell peppers", "olive oil", "herbs", "lemon"],
                n(550, 45.0, 30.0, 28.0, 8.0, 450.0),
                35,
                "medium",
            ),
            template(
                "Chicken Stir-Fry",
                "Asian-style chicken with mixed vegetables",
                &[
                    "chicken breast",
                    "broccoli",
                    "carrots",
                    "snap peas",
                    "soy sauce",
                    "ginger",
                    "brown rice",
                ],
                n(520, 42.0, 55.0, 14.0, 7.0, 600.0),
                25,
                "medium",
            ),
            template(
                "Lean Beef with Sweet Potato",
                "Grilled lean beef with roasted sweet potato",
                &["lean beef", "sweet potato", "green beans", "olive oil", "garlic"],
                n(580, 48.0, 45.0, 20.0, 9.0, 400.0),
                40,
                "medium",
            ),
        ],
        snacks: vec![
            template(
                "Apple with Almond Butter",
                "Fresh apple slices with natural almond butter",
                &["apple", "almond butter"],
                n(200, 6.0, 25.0, 10.0, 5.0, 0.0),
                5,
                "easy",
            ),
            template(
                "Protein Smoothie",
                "Banana protein smoothie with spinach",
                &["banana", "protein powder", "spinach", "almond milk"],
                n(220, 20.0, 28.0, 4.0, 4.0, 150.0),
                5,
                "easy",
            ),
        ],
    }
}

/// Standard set with the meat-based first lunch and dinner swapped out
#[must_use]
pub fn vegetarian_meals() -> MealSet {
    let mut meals = standard_meals();
    meals.lunch[0] = template(
        "Mediterranean Lentil Salad",
        "Protein-rich lentils with feta and vegetables",
        &["lentils", "feta cheese", "cucumber", "tomatoes", "olive oil", "lemon"],
        n(420, 22.0, 50.0, 16.0, 15.0, 400.0),
        25,
        "easy",
    );
    meals.dinner[0] = template(
        "Eggplant Parmesan",
        "Baked eggplant with marinara and mozzarella",
        &["eggplant", "marinara sauce", "mozzarella", "parmesan", "basil"],
        n(480, 24.0, 45.0, 22.0, 10.0, 700.0),
        45,
        "medium",
    );
    meals
}

/// One plant-based option per slot
#[must_use]
pub fn vegan_meals() -> MealSet {
    MealSet {
        breakfast: vec![template(
            "Tofu Scramble",
            "Scrambled tofu with vegetables",
            &["firm tofu", "bell peppers", "onions", "spinach", "turmeric", "nutritional yeast"],
            n(320, 18.0, 28.0, 16.0, 6.0, 300.0),
            15,
            "easy",
        )],
        lunch: vec![template(
            "Chickpea Buddha Bowl",
            "Roasted chickpeas with quinoa and tahini",
            &["chickpeas", "quinoa", "kale", "sweet potato", "tahini", "lemon"],
            n(480, 20.0, 65.0, 16.0, 14.0, 250.0),
            30,
            "medium",
        )],
        dinner: vec![template(
            "Lentil Curry",
            "Red lentil curry with coconut milk",
            &["red lentils", "coconut milk", "curry spices", "tomatoes", "spinach", "brown rice"],
            n(520, 22.0, 68.0, 18.0, 16.0, 400.0),
            35,
            "medium",
        )],
        snacks: vec![template(
            "Hummus with Vegetables",
            "Homemade hummus with carrot and celery sticks",
            &["chickpeas", "tahini", "lemon", "carrots", "celery"],
            n(180, 8.0, 20.0, 8.0, 7.0, 200.0),
            10,
            "easy",
        )],
    }
}

/// Standard set with sodium capped
#[must_use]
pub fn low_sodium_meals() -> MealSet {
    let mut meals = standard_meals();
    for meal in meals.all_meals_mut() {
        meal.nutrition.sodium = meal.nutrition.sodium.min(LOW_SODIUM_CAP);
    }
    meals
}

/// Standard set with 70% carbohydrates (truncated), 1.5x fiber and 1.2x protein
#[must_use]
pub fn diabetic_meals() -> MealSet {
    let mut meals = standard_meals();
    for meal in meals.all_meals_mut() {
        meal.nutrition.carbs = (meal.nutrition.carbs * 0.7).floor();
        meal.nutrition.fiber *= 1.5;
        meal.nutrition.protein *= 1.2;
    }
    meals
}
