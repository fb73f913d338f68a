use domains::{GuestComfort, SleepSchedule, User};

pub(crate) const SYSTEM_PROMPT: &str = "You are a knowledgeable local expert providing detailed \
city insights. Focus on practical, accurate information formatted in a structured way.";

/// Builds the seven-section request for `city, province` tailored to `user`.
pub(crate) fn build_prompt(city: &str, province: &str, user: &User, additional: Option<&str>) -> String {
    let prefs = &user.preferences;
    let occupation = user.occupation.as_deref().filter(|o| !o.trim().is_empty());

    let restrictions: Vec<&str> = prefs.declared_restrictions().map(|r| r.as_str()).collect();
    let dietary = if restrictions.is_empty() {
        "None".to_string()
    } else {
        restrictions.join(", ")
    };

    let mut special = Vec::new();
    if !restrictions.is_empty() {
        special.push("- Restaurants catering to dietary restrictions");
    }
    if prefs.prefers_pets {
        special.push("- Pet-friendly areas and services");
    }
    if prefs.sleep_schedule == SleepSchedule::NightOwl {
        special.push("- Late-night venues and services");
    }
    if prefs.guest_comfort != GuestComfort::Never {
        special.push("- Social gathering spaces and entertainment venues");
    }

    let additional = additional
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or("none");

    let mut prompt = format!(
        "I need detailed information about living in {city}, {province}, Canada for someone with the following preferences:

Personal Profile:
- Budget Range: {budget}
- Current Occupation: {occupation}
- Lifestyle: {smoker}, {drinker}
- Dietary Restrictions: {dietary}
- Pet Preferences: {pets}
- Cleanliness Level: {cleanliness}
- Sleep Schedule: {sleep}
- Guest Comfort: Comfortable having guests {guests}

Please provide a comprehensive analysis in the following structured format:

1. Housing & Rent:
- Average rent for different types of accommodations
- Best neighborhoods based on the budget
- Typical utility costs

2. Cost of Living:
- Monthly grocery expenses
- Transportation costs
- Entertainment expenses
- Average restaurant prices

3. Transportation:
- Public transit options
- Walkability score
- Cycling infrastructure
- Parking situation

4. Lifestyle & Entertainment:
- Popular areas for dining and nightlife
- Cultural attractions
- Outdoor activities
- Fitness and recreation

5. Employment Opportunities:
- Major employers in {field} field(s)
- Growing industries
- Average salaries
- Job market outlook

6. Safety & Considerations:
- Safe neighborhoods
- Areas to avoid
- Common concerns
- Weather considerations

7. Special Considerations (based on user preferences and input):
",
        budget = prefs.budget.summary(),
        occupation = occupation.unwrap_or("Not specified"),
        smoker = if prefs.smokes { "Smoker" } else { "Non-smoker" },
        drinker = if prefs.drinks { "Drinks alcohol" } else { "Non-drinker" },
        pets = if prefs.prefers_pets {
            "Pet-friendly environment preferred"
        } else {
            "No pets preferred"
        },
        cleanliness = prefs.cleanliness,
        sleep = prefs.sleep_schedule,
        guests = prefs.guest_comfort,
        field = occupation.unwrap_or("various"),
    );

    for line in special {
        prompt.push_str(line);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "Provide more information based on available {additional} considerations or preferences"
    ));
    prompt
}
