use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub content: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote {
        content: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    Quote {
        content: "Write it on your heart that every day is the best day in the year.",
        author: "Ralph Waldo Emerson",
    },
    Quote {
        content: "Life is what happens while you're busy making other plans.",
        author: "John Lennon",
    },
    Quote {
        content: "The future belongs to those who believe in the beauty of their dreams.",
        author: "Eleanor Roosevelt",
    },
    Quote {
        content: "Success is not final, failure is not fatal: it is the courage to continue that counts.",
        author: "Winston Churchill",
    },
    Quote {
        content: "The journey of a thousand miles begins with one step.",
        author: "Lao Tzu",
    },
    Quote {
        content: "What you get by achieving your goals is not as important as what you become by achieving your goals.",
        author: "Zig Ziglar",
    },
    Quote {
        content: "The best time to plant a tree was 20 years ago. The second best time is now.",
        author: "Chinese Proverb",
    },
    Quote {
        content: "Your time is limited, don't waste it living someone else's life.",
        author: "Steve Jobs",
    },
    Quote {
        content: "Everything you've ever wanted is on the other side of fear.",
        author: "George Addair",
    },
    Quote {
        content: "The only impossible journey is the one you never begin.",
        author: "Tony Robbins",
    },
    Quote {
        content: "The way to get started is to quit talking and begin doing.",
        author: "Walt Disney",
    },
    Quote {
        content: "Don't watch the clock; do what it does. Keep going.",
        author: "Sam Levenson",
    },
    Quote {
        content: "The past cannot be changed. The future is yet in your power.",
        author: "Mary Pickford",
    },
    Quote {
        content: "It does not matter how slowly you go as long as you do not stop.",
        author: "Confucius",
    },
    Quote {
        content: "You are never too old to set another goal or to dream a new dream.",
        author: "C.S. Lewis",
    },
    Quote {
        content: "The secret of getting ahead is getting started.",
        author: "Mark Twain",
    },
    Quote {
        content: "Do what you can, with what you have, where you are.",
        author: "Theodore Roosevelt",
    },
    Quote {
        content: "Everything has beauty, but not everyone sees it.",
        author: "Confucius",
    },
    Quote {
        content: "Believe you can and you're halfway there.",
        author: "Theodore Roosevelt",
    },
    Quote {
        content: "Start where you are. Use what you have. Do what you can.",
        author: "Arthur Ashe",
    },
    Quote {
        content: "The only person you are destined to become is the person you decide to be.",
        author: "Ralph Waldo Emerson",
    },
    Quote {
        content: "What lies behind us and what lies before us are tiny matters compared to what lies within us.",
        author: "Ralph Waldo Emerson",
    },
    Quote {
        content: "The best revenge is massive success.",
        author: "Frank Sinatra",
    },
];

/// The quote shown on `day`, rotating through the table one per day
pub fn quote_for_date(day: NaiveDate) -> &'static Quote {
    let index = day.num_days_from_ce().rem_euclid(QUOTES.len() as i32) as usize;
    &QUOTES[index]
}
