//! Built-in pattern tables.
//!
//! These are starting points, calibrated by hand. Production deployments
//! override them with a YAML file (see `adapters::patterns`).

use crate::domain::signal::SignalCategory;

use super::pattern::PatternRule;

fn rule(pattern: &str, weight: f64) -> PatternRule {
    PatternRule::new(pattern, weight)
}

pub(super) fn category_rules(category: SignalCategory) -> Vec<PatternRule> {
    match category {
        SignalCategory::Complaint => vec![
            rule(r"\b(terrible|awful|horrible|worst)\b.{0,40}\b(service|experience|support|company)\b", 0.8),
            rule(r"\b(never (again|coming back)|avoid (this|them))\b", 0.75),
            rule(r"\bwaste of (money|time)\b", 0.7),
            rule(r"\b(frustrat\w*|annoy\w*|fed up|sick of)\b", 0.6),
            rule(r"\b(rude|unprofessional|no.?show)\b", 0.6),
        ],
        SignalCategory::RecommendationRequest => vec![
            rule(r"\b(any(one)?|can (anyone|you)) recommend\w*", 0.9),
            rule(r"\bwho do you (use|recommend)\b", 0.85),
            rule(r"\blooking for (a|an|some) (good|reliable|new|better|decent)\b", 0.8),
            rule(r"\b(suggestions?|recommendations?) (for|on)\b", 0.75),
            rule(r"\bwhat('s| is) the best\b", 0.7),
        ],
        SignalCategory::FeatureComparison => vec![
            rule(r"\b(alternatives?) to\b", 0.8),
            rule(r"\bcompar(e|ing|ison)\b", 0.75),
            rule(r"\b(vs\.?|versus)\s", 0.7),
            rule(r"\b(pros and cons|which is better)\b", 0.7),
        ],
        SignalCategory::SwitchingIntent => vec![
            rule(r"\b(switch|switching|moving|migrat\w*) (away )?from\b", 0.9),
            rule(r"\b(cancel+\w*|leaving|ditch\w*|dump\w*) (my|our) (current )?(provider|vendor|subscription|plan|service|agency)\b", 0.9),
            rule(r"\breplac\w* (our|my) (current )?\w+", 0.75),
            rule(r"\bdone with (our|my|this)\b", 0.55),
        ],
        SignalCategory::PainPoint => vec![
            rule(r"\b(struggl\w*|can'?t figure out|pain point|bottleneck|headache)\b", 0.75),
            rule(r"\btakes? (forever|too long|hours)\b", 0.7),
            rule(r"\b(manual(ly)?|spreadsheets?)\b.{0,30}\b(tedious|slow|errors?)\b", 0.7),
            rule(r"\bwe keep (losing|missing|having)\b", 0.65),
        ],
        SignalCategory::Budget => vec![
            rule(r"\bbudget (is |has been |was )?(approved|allocated|set aside)\b", 0.9),
            rule(r"\bhow much (does|do|should|would)\b.{0,30}\b(cost|charge)\b", 0.75),
            rule(r"\b(pricing|quotes?|estimates?)\b", 0.6),
            rule(r"\b(affordable|cheaper|price range)\b", 0.5),
        ],
        SignalCategory::Growth => vec![
            rule(r"\b(raised|closed) (a |our )?(seed|series [a-e]|round|funding)\b", 0.85),
            rule(r"\bnew (location|office|store|branch)\b", 0.7),
            rule(r"\b(we'?re hiring|hiring|new hires?)\b", 0.65),
            rule(r"\b(doubl\w*|tripl\w*|growing fast|scal(e|ing) up)\b", 0.6),
        ],
        SignalCategory::ChurnRisk => vec![
            rule(r"\b(thinking about|considering) (leaving|cancel\w*|switching)\b", 0.85),
            rule(r"\b(unhappy|disappointed|not happy) with (my|our)\b", 0.75),
            rule(r"\bprice (increase|hike)\b", 0.7),
            rule(r"\bcontract (is )?(up|ending|expir\w*)\b", 0.7),
        ],
        SignalCategory::LifeEvent => vec![
            rule(r"\b(opened|opening|launch\w*) (a|my|our) (new )?(business|shop|store|practice)\b", 0.8),
            rule(r"\b(just )?(moved|moving) (to|into)\b", 0.75),
            rule(r"\b(new (home|house|baby|job)|getting married|wedding|retir\w*)\b", 0.75),
        ],
        SignalCategory::SeasonalDemand => vec![
            rule(r"\b(before|ahead of) the (season|holidays|rush)\b", 0.8),
            rule(r"\b(peak|busy) season\b", 0.75),
            rule(r"\b(holiday|christmas|black friday|back to school|tax season)\b", 0.6),
        ],
        SignalCategory::Renewal => vec![
            rule(r"\b(up for renewal|renewal (is )?(coming|due))\b", 0.9),
            rule(r"\brenew\w*\b.{0,30}\b(contract|subscription|license|lease)\b", 0.8),
            rule(r"\bauto.?renew\w*\b", 0.65),
        ],
        SignalCategory::Expansion => vec![
            rule(r"\b(expand\w*|expansion) (to|into)\b", 0.85),
            rule(r"\b(adding|add) (more )?(seats|users|licenses|locations)\b", 0.8),
            rule(r"\b(second|another) (location|market|team)\b", 0.7),
            rule(r"\brolling out (to|across)\b", 0.7),
        ],
    }
}

pub(super) fn immediate_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\b(asap|urgent\w*|immediately|right away|emergency)\b", 0.9)
            .with_days(3)
            .with_label("urgent language"),
        rule(r"\bneed (this|it|one|someone|a \w+) (today|this week|now)\b", 0.9)
            .with_days(3)
            .with_label("need it now"),
        rule(r"\b(cancel+ed|terminated|dropped) (my|our) (current )?(provider|vendor|service|subscription|plan|agency)\b", 0.9)
            .with_days(7)
            .with_label("cancelled current provider"),
        rule(r"\b(by|before) (the )?(end of (the )?(week|month)|friday|monday|tomorrow)\b", 0.85)
            .with_days(7)
            .with_label("explicit deadline"),
        rule(r"\bcontract (is )?(up for renewal|expir\w*|ends?|ending)\b", 0.85)
            .with_days(30)
            .with_label("contract expiration"),
        rule(r"\bbudget (is |has been |was )?(approved|signed off|allocated)\b", 0.85)
            .with_days(30)
            .with_label("approved budget"),
    ]
}

pub(super) fn active_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\bup for renewal\b", 0.75)
            .with_days(45)
            .with_label("renewal due"),
        rule(r"\b(evaluating|shortlist\w*|comparing (vendors|options|providers)|trialing|free trial)\b", 0.7)
            .with_days(45)
            .with_label("active evaluation"),
        rule(r"\b(demo|quote|proposal|rfp)\b", 0.65)
            .with_days(45)
            .with_label("demo or quote request"),
        rule(r"\b(next|in (a|two|three|few|2|3)) (few )?(weeks?|months?)\b", 0.6)
            .with_days(60)
            .with_label("timeline in weeks to months"),
        rule(r"\b(this|next) (quarter|q[1-4])\b", 0.6)
            .with_days(90)
            .with_label("quarter timeline"),
        rule(r"\b(just (raised|hired|promoted)|new (cmo|cto|ceo|vp|director|head of))\b", 0.55)
            .with_days(90)
            .with_label("growth or leadership change"),
        rule(r"\blooking (for|to hire|to switch)\b", 0.55)
            .with_days(60)
            .with_label("actively looking"),
    ]
}

pub(super) fn research_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\b(researching|reading up|learning about|any thoughts)\b", 0.45)
            .with_days(120)
            .with_label("researching"),
        rule(r"\b(thinking about|considering|might|maybe|wondering)\b", 0.4)
            .with_days(180)
            .with_label("hedged interest"),
        rule(r"\b(someday|eventually|one day|down the road|at some point)\b", 0.3)
            .with_days(365)
            .with_label("someday language"),
        rule(r"\b(what if|hypothetical\w*|in theory)\b", 0.3)
            .with_days(365)
            .with_label("hypothetical"),
    ]
}

pub(super) fn anti_urgency_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\bnot (looking|in the market)\b", 0.4).with_label("not in market"),
        rule(r"\b(already )?(happy|satisfied) with (our|my) (current )?\w+", 0.35)
            .with_label("happy with current solution"),
        rule(r"\bno rush\b", 0.25).with_label("no rush"),
        rule(r"\bjust curious\b", 0.25).with_label("just curious"),
        rule(r"\bjust (browsing|looking around)\b", 0.25).with_label("just browsing"),
        rule(r"\bnot right now\b", 0.2).with_label("not right now"),
    ]
}

pub(super) fn unaware_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\b(is (it|this) normal|why (does|do|is)|never thought)\b", 0.6),
        rule(r"\bjust (noticed|realized)\b", 0.5),
    ]
}

pub(super) fn problem_aware_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\bhow (do|can|should) (i|we) (fix|solve|stop|deal with|handle)\b", 0.7),
        rule(r"\b(struggl\w*|problem|issue|frustrat\w*|pain|can'?t)\b", 0.5),
    ]
}

pub(super) fn solution_aware_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\b(recommend\w*|alternatives?|options)\b", 0.6),
        rule(r"\b(compar\w*|versus|vs\.?)\s", 0.6),
        rule(r"\b(tool|software|service|provider|agency|platform|solution)s?\b.{0,20}\b(for|to)\b", 0.55),
    ]
}

pub(super) fn product_aware_rules() -> Vec<PatternRule> {
    vec![
        rule(r"\b(switch\w* (to|from)|sign(ed|ing)? up)\b", 0.7),
        rule(r"\b(pricing|demo|trial|quote|contract|renew\w*)\b", 0.65),
    ]
}
