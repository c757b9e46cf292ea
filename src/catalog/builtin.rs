use crate::db::MoodValue;

use super::{Activity, Difficulty};

fn tags(values: &[u8]) -> Vec<MoodValue> {
    values
        .iter()
        .filter_map(|v| MoodValue::new(*v as i64).ok())
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn activity(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    duration: &str,
    difficulty: Difficulty,
    mood_tags: &[u8],
    audio: Option<&str>,
) -> Activity {
    Activity {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        category: category.into(),
        duration: duration.into(),
        difficulty,
        mood_tags: tags(mood_tags),
        audio: audio.map(Into::into),
    }
}

/// Default catalog, in ascending id order.
pub(super) fn activities() -> Vec<Activity> {
    vec![
        activity(
            "1",
            "Share Your Joy",
            "Write down three things that made you happy today and share one with a friend or family member.",
            "Social Connection",
            "15 min",
            Difficulty::Easy,
            &[5],
            None,
        ),
        activity(
            "2",
            "Gratitude Letter",
            "Write a heartfelt thank-you note to someone who has positively impacted your life.",
            "Gratitude",
            "30 min",
            Difficulty::Medium,
            &[5, 4],
            None,
        ),
        activity(
            "3",
            "Mindful Movement",
            "Take a 10-minute walk outdoors and practice mindful observation of your surroundings.",
            "Physical Wellness",
            "10 min",
            Difficulty::Easy,
            &[4, 5],
            None,
        ),
        activity(
            "4",
            "Creative Expression",
            "Spend 20 minutes on a creative activity: draw, write, sing, or craft something new.",
            "Self-Expression",
            "20 min",
            Difficulty::Medium,
            &[4, 5],
            None,
        ),
        activity(
            "5",
            "Gentle Self-Care",
            "Practice a simple self-care routine: take a warm shower, listen to calming music, or enjoy herbal tea.",
            "Self-Care",
            "25 min",
            Difficulty::Easy,
            &[3, 2],
            None,
        ),
        activity(
            "6",
            "Breathing Reset",
            "Try the 4-7-8 breathing technique for 5 minutes to center yourself and reduce stress.",
            "Mindfulness",
            "5 min",
            Difficulty::Easy,
            &[3, 2, 1],
            None,
        ),
        activity(
            "7",
            "Micro-Accomplishment",
            "Complete one small, manageable task like organizing your desk or making your bed.",
            "Achievement",
            "10 min",
            Difficulty::Easy,
            &[2, 1],
            None,
        ),
        activity(
            "8",
            "Comfort Connection",
            "Reach out to someone you trust: send a text, make a call, or spend time with a supportive person.",
            "Social Support",
            "15 min",
            Difficulty::Medium,
            &[2, 1],
            None,
        ),
        activity(
            "9",
            "Grounding Exercise",
            "Use the 5-4-3-2-1 technique: name 5 things you see, 4 you can touch, 3 you hear, 2 you smell, 1 you taste.",
            "Anxiety Relief",
            "5 min",
            Difficulty::Easy,
            &[1],
            None,
        ),
        activity(
            "10",
            "Soothing Routine",
            "Create a calming environment: dim lights, play soft music, and practice gentle stretches or deep breathing.",
            "Relaxation",
            "20 min",
            Difficulty::Easy,
            &[1, 2],
            None,
        ),
        activity(
            "11",
            "Mindfulness Meditation",
            "A 10-minute guided meditation to help reduce stress and improve focus.",
            "Mental Health",
            "10 min",
            Difficulty::Easy,
            &[1, 2, 3],
            Some("audio/meditation.mp3"),
        ),
        activity(
            "12",
            "Evening Wind-Down",
            "Create a calming bedtime routine to improve sleep quality and reduce anxiety.",
            "Sleep",
            "45 min",
            Difficulty::Medium,
            &[1, 2],
            Some("audio/sleep.mp3"),
        ),
        activity(
            "13",
            "Nature Sounds",
            "Listen to calming rain sounds or forest ambiance to reduce stress levels.",
            "Relaxation",
            "25 min",
            Difficulty::Easy,
            &[2, 3, 4],
            Some("audio/nature.mp3"),
        ),
    ]
}
